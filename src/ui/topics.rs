//! Topic filter panel.

use crate::app::{App, Focus};
use crate::util::{display_width, sanitize_line};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const CLEAR_HINT: &str = "[c] clear";

/// Render the bordered, single-line topic panel.
///
/// Topics scroll sideways so the cursor stays visible.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let palette = &app.palette;
    let focused = app.focus == Focus::Topics;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Topics ")
        .border_style(if focused {
            palette.panel_border_focused
        } else {
            palette.panel_border
        });

    let mut width = usize::from(area.width.saturating_sub(2));
    let hint = app.clear_selection_visible && width > CLEAR_HINT.len() + 4;
    if hint {
        width -= CLEAR_HINT.len() + 1;
    }

    let labels: Vec<String> = app
        .controller
        .available_topics()
        .iter()
        .map(|topic| format!(" {} ", sanitize_line(topic)))
        .collect();
    let widths: Vec<usize> = labels.iter().map(|l| display_width(l)).collect();
    let start = first_visible(&widths, app.topic_cursor, width);

    let mut spans = Vec::new();
    let mut used = 0;
    for (i, label) in labels.iter().enumerate().skip(start) {
        if used + widths[i] > width {
            break;
        }
        let topic = &app.controller.available_topics()[i];
        let mut style = if app.selected_topics.contains(topic) {
            palette.topic_selected
        } else {
            palette.topic_normal
        };
        if focused && i == app.topic_cursor {
            style = style.patch(palette.topic_cursor);
        }
        spans.push(Span::styled(label.clone(), style));
        used += widths[i];
    }

    if hint {
        let pad = width.saturating_sub(used) + 1;
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(CLEAR_HINT, palette.clear_selection));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// First label to draw so that `cursor` fits within `width` columns.
fn first_visible(widths: &[usize], cursor: usize, width: usize) -> usize {
    let cursor = cursor.min(widths.len().saturating_sub(1));
    let mut start = 0;
    let mut span: usize = widths.iter().take(cursor + 1).sum();
    while span > width && start < cursor {
        span -= widths[start];
        start += 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visible_keeps_cursor_on_screen() {
        let widths = [5, 5, 5, 5];
        assert_eq!(first_visible(&widths, 0, 10), 0);
        assert_eq!(first_visible(&widths, 1, 10), 0);
        assert_eq!(first_visible(&widths, 2, 10), 1);
        assert_eq!(first_visible(&widths, 3, 10), 2);
    }

    #[test]
    fn test_first_visible_empty() {
        assert_eq!(first_visible(&[], 0, 10), 0);
    }
}
