//! Article index loading.
//!
//! A static site publishes `content/index.json`: an ordered JSON array of
//! article records. This module owns the record type and the single fetch
//! that loads the index for a page view.
//!
//! - [`ArticleRecord`] and [`parse_index`] - the record type and defensive
//!   parsing of the document
//! - [`IndexFetcher`] - HTTP or filesystem retrieval with size and time limits

mod fetcher;
mod record;

pub use fetcher::{IndexFetcher, IndexSource, LoadError, FETCH_TIMEOUT, MAX_INDEX_SIZE};
pub use record::{parse_index, ArticleRecord, FullIndex};
