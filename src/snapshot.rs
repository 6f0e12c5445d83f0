//! Non-interactive HTML output.
//!
//! Drives a [`FeedController`] without a terminal and writes the resulting
//! card list as HTML. Listing pages are loaded to the end of the active
//! view; summary pages stop at their fixed prefix.

use crate::card::escape_html;
use crate::feed::{DisplayDelta, DisplayOp, FeedController, PageMode};

const NO_RESULTS_NOTICE: &str = "No articles match the selected topics.";

/// Apply `initial` (the delta from installing the index) and render the page.
pub fn render_page_html(controller: &mut FeedController, initial: DisplayDelta) -> String {
    let mut page = PageHtml::default();
    page.apply(initial, controller);

    if controller.mode() == PageMode::FullListing {
        loop {
            page.apply(controller.finish_load(), controller);
            if controller.cursor() >= controller.active_len() {
                break;
            }
            let delta = controller.load_more(None);
            if delta.appended() == 0 {
                break;
            }
            page.apply(delta, controller);
        }
    }
    page.apply(controller.finish_load(), controller);

    page.finish()
}

#[derive(Default)]
struct PageHtml {
    cards: Vec<String>,
    notice: Option<String>,
}

impl PageHtml {
    fn apply(&mut self, delta: DisplayDelta, controller: &FeedController) {
        let filter = controller.filter();
        for op in delta {
            match op {
                DisplayOp::Clear => {
                    self.cards.clear();
                    self.notice = None;
                }
                DisplayOp::Append(cards) => {
                    self.cards
                        .extend(cards.iter().map(|card| card.to_html(|t| filter.contains(t))));
                }
                DisplayOp::ShowError(msg) => {
                    self.cards.clear();
                    self.notice = Some(format!("<p class=\"error\">{}</p>\n", escape_html(&msg)));
                }
                DisplayOp::NoResults(true) => {
                    self.notice = Some(format!("<p class=\"no-results\">{}</p>\n", NO_RESULTS_NOTICE));
                }
                DisplayOp::NoResults(false) => self.notice = None,
                _ => {}
            }
        }
    }

    fn finish(self) -> String {
        let mut html = String::new();
        if let Some(notice) = self.notice {
            html.push_str(&notice);
        }
        for card in self.cards {
            html.push_str(&card);
        }
        html
    }
}
