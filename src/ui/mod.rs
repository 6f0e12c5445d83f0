//! Terminal User Interface module.
//!
//! Hosts a [`FeedController`](crate::feed::FeedController) in the terminal:
//! cards are laid out in a grid, the keyboard and mouse wheel stand in for
//! page scrolling, and terminal resizes feed the controller's debounced
//! batch sizing.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Frame layout dispatch
//! - `helpers` - Shared utility functions
//! - `cards` - Card grid widget
//! - `topics` - Topic filter panel widget
//! - `status` - Header and status bar widgets
//! - `help` - Keys and page info overlay

mod cards;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;
mod topics;

pub use loop_runner::{run, Action};
