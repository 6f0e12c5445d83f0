//! Info overlay.
//!
//! Shows every keybinding grouped by context, including user overrides from
//! config, followed by a summary of the page state.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::helpers::centered_rect;

/// Context display order and labels.
const CONTEXT_ORDER: [(Context, &str); 4] = [
    (Context::Global, "General"),
    (Context::Cards, "Cards"),
    (Context::Topics, "Topics"),
    (Context::Info, "Overlay"),
];

/// Rows reserved for the page summary below the key table.
const PAGE_INFO_ROWS: u16 = 7;

/// Render the info overlay on top of the page.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < PAGE_INFO_ROWS + 6 {
        return;
    }

    f.render_widget(Clear, overlay);
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border_focused)
        .title(" Info (? or Esc to close) ");
    let inner = outer.inner(overlay);
    f.render_widget(outer, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(PAGE_INFO_ROWS)])
        .split(inner);

    let bindings = app.keybindings.all_bindings();
    let mut rows: Vec<Row> = Vec::new();
    for (ctx, label) in &CONTEXT_ORDER {
        let ctx_bindings: Vec<_> = bindings.iter().filter(|(c, _, _, _)| c == ctx).collect();
        if ctx_bindings.is_empty() {
            continue;
        }

        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ]));
        for (_, key_str, _action, description) in ctx_bindings {
            rows.push(Row::new(vec![
                format!("  {}", key_str),
                description.to_string(),
            ]));
        }
    }

    let visible = usize::from(chunks[0].height.saturating_sub(2));
    let rows: Vec<Row> = rows.into_iter().take(visible).collect();
    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(20)])
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.palette.card_excerpt);
    f.render_widget(table, chunks[0]);

    f.render_widget(
        Paragraph::new(page_info(app)).style(app.palette.card_date),
        chunks[1],
    );
}

fn page_info(app: &App) -> Vec<Line<'static>> {
    let controller = &app.controller;
    let topics = if controller.filter().is_empty() {
        "none".to_string()
    } else {
        controller.filter().iter().collect::<Vec<_>>().join(", ")
    };
    let state = if controller.has_failed() {
        "failed"
    } else if controller.is_ready() {
        "ready"
    } else {
        "loading"
    };

    vec![
        Line::from(Span::styled(
            "-- Page --",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("  Location:  {}", app.history.current())),
        Line::from(format!("  Mode:      {} ({})", controller.mode().name(), state)),
        Line::from(format!(
            "  Shown:     {} of {} ({} in index)",
            controller.cursor(),
            controller.active_len(),
            controller.index().len()
        )),
        Line::from(format!("  Batch:     {}", controller.batch_size())),
        Line::from(format!("  Topics:    {}", topics)),
    ]
}
