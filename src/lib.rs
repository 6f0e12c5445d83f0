//! postgrid: browse a static site's article index from the terminal.
//!
//! The crate is split into a side-effect-free core and a terminal host:
//!
//! - [`index`] - the article record type and index loading (HTTP or file)
//! - [`card`] - pure record → card fragment rendering (HTML and terminal)
//! - [`feed`] - the feed controller: filtering, pagination, display deltas
//! - [`location`] - page URL handling (`?topic=` contract, history)
//! - [`app`] / [`ui`] - the ratatui host that applies display deltas
//! - [`snapshot`] - the same deltas written out as HTML
//!
//! Ambient pieces ([`config`], [`preferences`], [`keybindings`], [`theme`],
//! [`util`]) follow the same layout as the rest of the crate.

pub mod app;
pub mod card;
pub mod config;
pub mod feed;
pub mod index;
pub mod keybindings;
pub mod location;
pub mod preferences;
pub mod snapshot;
pub mod theme;
pub mod ui;
pub mod util;
