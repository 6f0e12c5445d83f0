//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task events, and a periodic tick
//! that drives status expiry and the resize debounce.

use crate::app::{App, AppEvent};
use crate::index::IndexFetcher;
use anyhow::{Context as _, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::{handle_app_event, INDEX_FETCH_TASK};
use super::helpers::catch_task_panic;
use super::input::handle_input;
use super::render::render;

/// Tick period; short enough that a settled resize is applied promptly.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// The index fetch is spawned as a background task as soon as the terminal
/// is up, so the loading indicator is visible while it runs. Uses
/// `tokio::select!` over:
/// - **Signals**: SIGTERM/SIGINT shut down gracefully
/// - **Terminal input**: keys, mouse wheel and resizes
/// - **Background tasks**: the index fetch result
/// - **Periodic tick**: status expiry and the resize debounce
///
/// Installs a panic hook that restores terminal state before unwinding.
pub async fn run(app: &mut App, fetcher: IndexFetcher) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let size = terminal.size()?;
    app.terminal_size = (size.width, size.height);

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(8);
    spawn_index_fetch(fetcher, event_tx);

    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        match handle_input(app, key.code, key.modifiers) {
                            Action::Quit => break,
                            Action::Continue => {}
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                        MouseEventKind::ScrollDown => app.wheel(true),
                        MouseEventKind::ScrollUp => app.wheel(false),
                        _ => {}
                    },
                    Some(Ok(Event::Resize(width, height))) => {
                        app.on_terminal_resize(width, height, Instant::now());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event stream error");
                    }
                    None => break,
                }
            }

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now());
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Fetch the index once in the background and report the result.
fn spawn_index_fetch(fetcher: IndexFetcher, tx: mpsc::Sender<AppEvent>) {
    tracing::debug!(source = %fetcher.source(), "Spawning index fetch");
    tokio::spawn(async move {
        let event = match catch_task_panic(fetcher.fetch()).await {
            Ok(result) => AppEvent::IndexLoaded(result),
            Err(error) => AppEvent::TaskPanicked {
                task: INDEX_FETCH_TASK,
                error,
            },
        };
        if tx.send(event).await.is_err() {
            tracing::debug!("Index fetch finished after the UI closed");
        }
    });
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
