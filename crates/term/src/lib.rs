//! Terminal rendering for the hole matching game.
//!
//! A small game-oriented layer: the level snapshot is drawn into a plain
//! framebuffer ([`GameView`]) which is then diffed and flushed to the terminal
//! ([`TerminalRenderer`]). No widget toolkit is involved, which keeps frame
//! output precise and lets the view be tested without a terminal.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use hole_match_core as core;
pub use hole_match_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{hole_rgb, AdapterStatusView, GameView, Hud, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
