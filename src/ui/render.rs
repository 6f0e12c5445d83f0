//! Render functions for the TUI.
//!
//! Splits the frame into header, optional topic panel, card grid and status
//! bar, then draws the info overlay on top when it is open.

use crate::app::{App, TOPIC_PANEL_ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::{Block, Paragraph},
    Frame,
};

use super::{cards, help, status, topics};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 30;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.palette.background), area);

    let panel_rows = if app.filters_visible {
        TOPIC_PANEL_ROWS
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(panel_rows),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    status::render_header(f, app, chunks[0]);
    if app.filters_visible {
        topics::render(f, app, chunks[1]);
    }
    cards::render(f, app, chunks[2]);
    status::render(f, app, chunks[3]);

    if app.show_info {
        help::render(f, app);
    }
}
