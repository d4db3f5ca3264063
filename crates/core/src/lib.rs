//! Core matching logic - pure, deterministic, and testable
//!
//! This crate holds the rules of the hole matching game: the board of
//! columns, the container row, the car pool and the resolver that ties them
//! together. It has **no dependencies** on terminals, sockets or files:
//!
//! - **Deterministic**: the same taps at the same times give the same level
//! - **Single owner**: one [`Level`] owns everything a running board needs
//! - **Headless**: geometry and animation are asked of injected collaborators
//!   ([`PathProbe`], [`Animator`])
//!
//! # Module Structure
//!
//! - [`board`]: columns of holes, front-row removal and shifting, grouped pairs
//! - [`containers`]: fixed container slots, nearest-empty lookup, fullness
//! - [`cars`]: car pool, nearest unblocked / fallback car lookup
//! - [`resolver`]: taps, hole arrival, car dispatch, sweep, win and fail
//! - [`level`]: the owner of a running level and its tick loop
//! - [`session`]: level catalog, restart / next level, progress persistence
//! - [`timeline`]: delayed continuations driven by `tick`
//! - [`timer`]: level countdown
//!
//! # Rules
//!
//! - Only the front hole of a column can be tapped; the column shifts forward
//!   as soon as the hole leaves.
//! - A hole lands in the nearest empty container, then waits for the nearest
//!   car of its colour whose route is clear.
//! - Grouped holes take the hole behind them along when two containers are
//!   free, or queue it when only one is.
//! - The level is lost when every container holds a waiting hole and no car
//!   can reach any of them, or when the countdown runs out. It is won when
//!   the last car has fallen into its hole.
//!
//! # Example
//!
//! ```
//! use hole_match_core::{Level, LevelData, ColumnData, HoleData, CarData, Layout};
//! use hole_match_core::types::{HoleColor, LevelStatus, Vec3, TICK_MS};
//!
//! let data = LevelData {
//!     columns: vec![ColumnData { holes: vec![HoleData::plain(HoleColor::Red)] }],
//!     container_count: 1,
//!     cars: vec![CarData::new(HoleColor::Red, Vec3::new(0.0, 0.0, 10.0))],
//!     ..LevelData::default()
//! };
//! let mut level = Level::load(&data, Layout::default()).unwrap();
//!
//! level.tap_column(0).unwrap();
//! for _ in 0..500 {
//!     level.tick(TICK_MS);
//! }
//! assert_eq!(level.status(), LevelStatus::Won);
//! ```
//!
//! # Timing
//!
//! Call [`Level::tick`] every frame with the elapsed time. Hole flights, car
//! drives and clean-ups are continuations on the level's timeline; each one
//! re-checks the state it expects before acting, and every one of them is
//! dropped when the level is torn down.

pub mod animator;
pub mod board;
pub mod cars;
pub mod containers;
pub mod error;
pub mod hole;
pub mod layout;
pub mod level;
pub mod level_data;
pub mod probe;
pub mod resolver;
pub mod session;
pub mod snapshot;
pub mod timeline;
pub mod timer;

pub use hole_match_types as types;

// Re-export commonly used types for convenience
pub use animator::{Animator, TweenTimings};
pub use board::{Board, PartnerTable};
pub use cars::{Car, CarPool, CarState, Removal};
pub use containers::{Container, ContainerPool};
pub use error::{BoardError, ContainerError, LevelDataError, MoveError, ProgressError};
pub use hole::{Hole, HoleState};
pub use layout::Layout;
pub use level::Level;
pub use level_data::{CarData, ColumnData, HoleData, LevelCatalog, LevelData};
pub use probe::{CorridorProbe, OpenRoad, PathProbe};
pub use resolver::TapOutcome;
pub use session::{MemoryProgress, ProgressStore, Session};
pub use snapshot::{CarPhase, CarView, ContainerView, HolePhase, HoleView, LevelSnapshot};
pub use timeline::{Continuation, Timeline};
pub use timer::{CountdownTimer, TimerTick};
