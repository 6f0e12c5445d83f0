use crate::app::{App, Focus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the one-line header: page location, theme and loading state.
pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let style = app.palette.status_bar;
    let mut spans = vec![
        Span::styled(" postgrid", style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" · {}", app.history.current()), style),
    ];
    if app.loading && app.error_notice.is_none() {
        spans.push(Span::styled("  loading…", app.palette.loading));
    }

    let right = format!("{} ", app.theme_variant.name());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right.len() as u16)])
        .split(area);

    f.render_widget(Paragraph::new(Line::from(spans)).style(style), chunks[0]);
    f.render_widget(Paragraph::new(right).style(style), chunks[1]);
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.focus {
            Focus::Topics => {
                Cow::Borrowed("[h/l]move [Enter]toggle [c]lear [Tab]cards [Esc]close [?]info")
            }
            Focus::Cards if app.controller.mode().has_filters() => {
                Cow::Borrowed("[hjkl]move [o]pen [t]opic [f]ilters [T]heme [?]info [q]uit")
            }
            Focus::Cards => Cow::Borrowed("[hjkl]move [o]pen [T]heme [?]info [q]uit"),
        }
    };

    let count = format!(
        "{}/{} ",
        app.controller.cursor(),
        app.controller.active_len()
    );
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(count.len() as u16)])
        .split(area);

    let style = app.palette.status_bar;
    f.render_widget(Paragraph::new(text).style(style), chunks[0]);
    f.render_widget(Paragraph::new(count).style(style), chunks[1]);
}
