//! Hole Match (workspace facade crate).
//!
//! The rules live in `hole_match_core`; this package wires them to the
//! terminal, the AI adapter, the level catalog file and the progress file,
//! and re-exports the member crates as `hole_match::{core,adapter,term,input,types}`.

pub mod catalog;
pub mod config;
pub mod play;
pub mod progress;

pub use hole_match_adapter as adapter;
pub use hole_match_core as core;
pub use hole_match_input as input;
pub use hole_match_term as term;
pub use hole_match_types as types;
