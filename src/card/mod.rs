//! Card rendering: one [`ArticleRecord`] in, one [`CardFragment`] out.
//!
//! Rendering is pure. Missing optional fields drop their part of the card,
//! and a `written` value that does not parse is shown verbatim, so a single
//! odd record never interrupts a batch.
//!
//! A fragment has two encodings: the site's HTML card markup
//! ([`CardFragment::to_html`]) and the terminal card drawn by the TUI.

mod date;
mod html;

pub use date::{format_written, parse_written, DateStyle};
pub use html::escape_html;

use url::form_urlencoded;

use crate::index::ArticleRecord;
use crate::location::{build_url, TOPIC_PARAM};

/// Listing page that topic links point at.
pub const LISTING_PATH: &str = "blog";

/// Inputs shared by every card on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardContext {
    /// Site base URL or path prefix; empty for a site served at the root.
    pub base_url: String,
    pub date_style: DateStyle,
}

impl CardContext {
    pub fn new(base_url: impl Into<String>, date_style: DateStyle) -> Self {
        Self {
            base_url: base_url.into(),
            date_style,
        }
    }
}

/// A rendered publication date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDate {
    /// The raw `written` value, used as the machine-readable attribute.
    pub datetime: String,
    /// Viewer-facing text: formatted, or the raw value when unparseable.
    pub text: String,
}

/// A topic tag on a card, linking to the filtered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLink {
    pub topic: String,
    pub href: String,
}

/// Display-ready card for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFragment {
    pub title: String,
    pub href: String,
    pub date: Option<DisplayDate>,
    pub topics: Vec<TopicLink>,
    pub excerpt: Option<String>,
}

/// Map one record to its card.
pub fn render_card(record: &ArticleRecord, ctx: &CardContext) -> CardFragment {
    let listing_url = build_url(&ctx.base_url, &[LISTING_PATH]);

    let date = record.written.as_deref().map(|raw| DisplayDate {
        datetime: raw.to_string(),
        text: format_written(raw, ctx.date_style),
    });

    let topics = record
        .topics()
        .iter()
        .map(|topic| TopicLink {
            topic: topic.clone(),
            href: topic_href(&listing_url, topic),
        })
        .collect();

    CardFragment {
        title: record.title.clone(),
        href: build_url(&ctx.base_url, &[&record.url]),
        date,
        topics,
        excerpt: record.description().map(str::to_string),
    }
}

fn topic_href(listing_url: &str, topic: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(topic.as_bytes()).collect();
    format!("{}?{}={}", listing_url, TOPIC_PARAM, encoded)
}
