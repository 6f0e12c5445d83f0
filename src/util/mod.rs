//! Utility functions shared by the renderer and the TUI.
//!
//! - **Link validation**: only http/https links are handed to the browser
//! - **Text processing**: terminal-safe, Unicode-width-aware text fitting
//!
//! # Examples
//!
//! ```
//! use postgrid::util::{display_width, truncate_to_width, wrap_to_width};
//!
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! assert_eq!(wrap_to_width("one two three", 7, 2), ["one two", "three"]);
//! ```

mod text;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width, wrap_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
