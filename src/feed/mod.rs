//! The feed controller and its supporting pieces.
//!
//! The controller holds the full index, the topic filter, the filtered view
//! and the display cursor, and turns page events (index loaded, filter
//! changed, scrolled, resized) into [`DisplayDelta`]s for a host to apply.
//!
//! - [`controller`] - [`FeedController`] state machine
//! - [`filter`] - [`FilterSet`] with AND semantics
//! - [`batch`] - viewport batch sizing and the scroll trigger
//! - [`delta`] - [`DisplayOp`] / [`DisplayDelta`] output types
//!
//! # Example
//!
//! ```
//! use postgrid::card::CardContext;
//! use postgrid::feed::{BatchPolicy, FeedController, PageContext, PageMode, ViewportGeometry};
//! use postgrid::index::ArticleRecord;
//! use postgrid::location::PageLocation;
//!
//! let index: Vec<_> = (0..25)
//!     .map(|i| ArticleRecord::new(format!("/{i}"), format!("Post {i}")))
//!     .collect();
//!
//! let mut controller =
//!     FeedController::new(PageMode::FullListing, BatchPolicy::default(), CardContext::default());
//! let page = PageContext::new(PageLocation::parse("/blog"), ViewportGeometry::new(700.0, 2000.0));
//! let delta = controller.install_index(Ok(index.into()), page);
//! assert_eq!(delta.appended(), controller.cursor());
//! controller.finish_load();
//! ```

pub mod batch;
pub mod controller;
pub mod delta;
pub mod filter;

pub use batch::{
    crossed_load_threshold, estimate_viewport_batch, load_threshold, BatchPolicy, CardMeasure,
    ScrollMetrics, ViewportGeometry,
};
pub use controller::{
    FeedController, PageContext, PageMode, LOAD_ERROR_NOTICE, RESIZE_QUIET_PERIOD, SUMMARY_PREFIX,
};
pub use delta::{DisplayDelta, DisplayOp};
pub use filter::{collect_topics, FilterSet};
