//! Card grid widget.
//!
//! Cards are fixed-size tiles laid out row-major. Each visible card is drawn
//! into its own off-screen buffer and the rows that fall inside the viewport
//! are copied over, so a card cut by the top or bottom edge still shows its
//! visible part correctly.

use crate::app::{App, CARD_COLUMNS, CARD_ROWS};
use crate::card::CardFragment;
use crate::util::{sanitize_line, truncate_to_width, wrap_to_width};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

const TITLE_LINES: usize = 2;
const EXCERPT_LINES: usize = 3;

/// Render the card grid, or the notice that replaces it.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if let Some(notice) = &app.error_notice {
        render_notice(f, area, notice, app.palette.notice_error);
        return;
    }
    if app.no_results {
        render_notice(
            f,
            area,
            "No articles match the selected topics.",
            app.palette.notice_empty,
        );
        return;
    }
    if app.cards.is_empty() {
        if app.loading {
            render_notice(f, area, "Loading articles...", app.palette.loading);
        }
        return;
    }

    let layout = app.layout();
    let card_width = CARD_COLUMNS.min(area.width);
    let grid_width = card_width.saturating_mul(layout.columns as u16);
    let left = area.x + area.width.saturating_sub(grid_width) / 2;

    let card_rows = usize::from(CARD_ROWS);
    let top = app.scroll_offset;
    let bottom = top + usize::from(area.height);

    let first_row = top / card_rows;
    let last_row = bottom.div_ceil(card_rows);
    let first = first_row * layout.columns;
    let last = (last_row * layout.columns).min(app.cards.len());

    for index in first..last {
        let row = layout.row_of(index);
        let column = (index % layout.columns) as u16;
        let selected = index == app.selected_card;

        let tile = Rect::new(0, 0, card_width, CARD_ROWS);
        let mut tile_buf = Buffer::empty(tile);
        card_widget(&app.cards[index], app, selected, card_width).render(tile, &mut tile_buf);

        let x = left + column * card_width;
        let card_top = row * card_rows;
        blit_rows(&tile_buf, f.buffer_mut(), area, x, card_top, top);
    }
}

/// Copy the rows of `tile` that are inside the viewport onto `dst`.
///
/// `card_top` and `scroll_top` are in grid rows; `area` is the viewport.
fn blit_rows(tile: &Buffer, dst: &mut Buffer, area: Rect, x: u16, card_top: usize, scroll_top: usize) {
    let tile_area = tile.area;
    for ty in 0..tile_area.height {
        let grid_row = card_top + usize::from(ty);
        if grid_row < scroll_top {
            continue;
        }
        let Ok(offset) = u16::try_from(grid_row - scroll_top) else {
            break;
        };
        if offset >= area.height {
            break;
        }
        let y = area.y + offset;
        for tx in 0..tile_area.width {
            let dx = x + tx;
            if dx >= area.x + area.width {
                break;
            }
            if let (Some(src), Some(cell)) = (tile.cell((tx, ty)), dst.cell_mut((dx, y))) {
                *cell = src.clone();
            }
        }
    }
}

/// Build the bordered paragraph for one card.
fn card_widget<'a>(card: &'a CardFragment, app: &'a App, selected: bool, width: u16) -> Paragraph<'a> {
    let palette = &app.palette;
    let inner = usize::from(width.saturating_sub(2));
    let mut lines: Vec<Line> = Vec::with_capacity(usize::from(CARD_ROWS));

    let title = sanitize_line(&card.title);
    let mut title_lines = wrap_to_width(&title, inner, TITLE_LINES);
    if title_lines.is_empty() {
        title_lines.push(String::new());
    }
    for line in title_lines {
        lines.push(Line::from(Span::styled(line, palette.card_title)));
    }

    let meta = meta_line(card, app, inner);
    if !meta.spans.is_empty() {
        lines.push(meta);
    }

    if let Some(excerpt) = &card.excerpt {
        let excerpt = sanitize_line(excerpt);
        let room = usize::from(CARD_ROWS).saturating_sub(2 + lines.len());
        for line in wrap_to_width(&excerpt, inner, room.min(EXCERPT_LINES)) {
            lines.push(Line::from(Span::styled(line, palette.card_excerpt)));
        }
    }

    let border = if selected {
        palette.card_border_selected
    } else {
        palette.card_border
    };
    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).border_style(border))
}

/// Date followed by topic tags, cut to `width` columns.
fn meta_line<'a>(card: &'a CardFragment, app: &App, width: usize) -> Line<'a> {
    let palette = &app.palette;
    let mut spans: Vec<Span> = Vec::new();
    let mut used = 0;

    if let Some(date) = &card.date {
        let text = truncate_to_width(&date.text, width).into_owned();
        used += crate::util::display_width(&text);
        spans.push(Span::styled(text, palette.card_date));
    }

    for link in &card.topics {
        let tag = format!("#{}", sanitize_line(&link.topic));
        let needed = crate::util::display_width(&tag) + usize::from(!spans.is_empty());
        if used + needed > width {
            break;
        }
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        let style: Style = if app.selected_topics.contains(&link.topic) {
            palette.topic_selected
        } else {
            palette.topic_normal
        };
        spans.push(Span::styled(tag, style));
        used += needed;
    }

    Line::from(spans)
}

fn render_notice(f: &mut Frame, area: Rect, text: &str, style: Style) {
    let y = area.y + area.height / 3;
    let line_area = Rect::new(area.x, y, area.width, 1);
    let paragraph = Paragraph::new(text.to_string())
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, line_area);
}
