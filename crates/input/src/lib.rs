//! Terminal input module.
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and keeps the
//! column cursor the terminal front-end taps through. Nothing in here knows
//! about the rules; the caller decides what an action does.

pub mod cursor;
pub mod map;

pub use hole_match_types as types;

pub use cursor::ColumnCursor;
pub use map::{handle_key_event, should_quit};
