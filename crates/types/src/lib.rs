//! Shared types and constants for the hole matching game.
//!
//! Everything in here is plain data: identifiers, colour tags, event and
//! action enums and the timing constants the core and the front-ends agree
//! on. The crate has no behaviour beyond parsing and small geometry helpers,
//! so it can be used from the core, the terminal view and the AI protocol
//! alike.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `HOLE_MOVE_MS` | 800 | Hole flight from the board into a container |
//! | `SWEEP_DELAY_MS` | 300 | Settle delay before re-checking waiting holes |
//! | `CONTAINER_CLEANUP_MS` | 700 | Car fall until the container is free again |
//! | `CAR_FALL_MS` | 1200 | Car fall until the car leaves the pool |
//! | `CAR_RETURN_MS` | 900 | Bumped car driving back to its parking spot |
//!
//! # Examples
//!
//! ```
//! use hole_match_types::{GameAction, HoleColor, Vec3};
//!
//! assert_eq!(HoleColor::from_str("LightPink"), Some(HoleColor::LightPink));
//! assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
//!
//! let a = Vec3::new(0.0, 0.0, 0.0);
//! let b = Vec3::new(3.0, 4.0, 0.0);
//! assert_eq!(a.distance(b), 5.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Duration of a hole's flight into its container.
pub const HOLE_MOVE_MS: u32 = 800;

/// Delay before the global sweep after a hole has been matched.
pub const SWEEP_DELAY_MS: u32 = 300;

/// Time from a car starting to fall until its container is released.
pub const CONTAINER_CLEANUP_MS: u32 = 700;

/// Time from a car starting to fall until it is removed from the pool.
pub const CAR_FALL_MS: u32 = 1200;

/// Time a bumped car needs to get back to where it started.
pub const CAR_RETURN_MS: u32 = 900;

/// Car driving speed in world units per second.
pub const CAR_SPEED: f32 = 12.0;

/// Upper bound for a single car drive.
pub const CAR_MAX_DRIVE_MS: u32 = 2500;

/// Remaining seconds at which the countdown starts warning.
pub const TIMER_WARNING_SECS: u32 = 10;

/// Container count used when level data does not name one.
pub const DEFAULT_CONTAINER_COUNT: usize = 3;

/// Countdown length used when level data does not name one.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

/// Colour tag shared by holes and cars. A car only ever falls into a hole of
/// the same colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoleColor {
    Red,
    Yellow,
    Purple,
    Pink,
    LightPink,
    Orange,
    Blue,
    LightBlue,
    DarkBlue,
    Green,
    LightGreen,
    DarkGreen,
    LightBrown,
    DarkBrown,
}

impl HoleColor {
    pub const ALL: [HoleColor; 14] = [
        HoleColor::Red,
        HoleColor::Yellow,
        HoleColor::Purple,
        HoleColor::Pink,
        HoleColor::LightPink,
        HoleColor::Orange,
        HoleColor::Blue,
        HoleColor::LightBlue,
        HoleColor::DarkBlue,
        HoleColor::Green,
        HoleColor::LightGreen,
        HoleColor::DarkGreen,
        HoleColor::LightBrown,
        HoleColor::DarkBrown,
    ];

    /// Parse a colour tag (case-insensitive).
    ///
    /// ```
    /// use hole_match_types::HoleColor;
    ///
    /// assert_eq!(HoleColor::from_str("red"), Some(HoleColor::Red));
    /// assert_eq!(HoleColor::from_str("DarkBrown"), Some(HoleColor::DarkBrown));
    /// assert_eq!(HoleColor::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        HoleColor::ALL.into_iter().find(|c| c.as_str() == lower)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoleColor::Red => "red",
            HoleColor::Yellow => "yellow",
            HoleColor::Purple => "purple",
            HoleColor::Pink => "pink",
            HoleColor::LightPink => "lightpink",
            HoleColor::Orange => "orange",
            HoleColor::Blue => "blue",
            HoleColor::LightBlue => "lightblue",
            HoleColor::DarkBlue => "darkblue",
            HoleColor::Green => "green",
            HoleColor::LightGreen => "lightgreen",
            HoleColor::DarkGreen => "darkgreen",
            HoleColor::LightBrown => "lightbrown",
            HoleColor::DarkBrown => "darkbrown",
        }
    }
}

impl fmt::Display for HoleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special behaviour attached to a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialKind {
    #[default]
    None,
    /// Moves together with the hole directly behind it in the same column.
    Grouped,
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Stable identifier of a hole within one loaded level.
    HoleId,
    "h"
);
id_type!(
    /// Stable identifier of a car within one loaded level.
    CarId,
    "car"
);
id_type!(
    /// Index of a container slot.
    ContainerId,
    "c"
);

/// World-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, k: f32) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        self.sub(other).length()
    }

    /// Shortest distance from `self` to the segment `a..b`.
    pub fn distance_to_segment(self, a: Vec3, b: Vec3) -> f32 {
        let ab = b.sub(a);
        let len_sq = ab.dot(ab);
        if len_sq <= f32::EPSILON {
            return self.distance(a);
        }
        let t = (self.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.distance(a.add(ab.scale(t)))
    }
}

/// Why a level was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailReason {
    /// The countdown expired.
    TimeUp,
    /// Every container holds a hole that no car can reach.
    NoSpace,
}

impl FailReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailReason::TimeUp => "timeUp",
            FailReason::NoSpace => "noSpace",
        }
    }
}

/// Lifecycle of a running level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum LevelStatus {
    #[default]
    Playing,
    Won,
    Failed(FailReason),
}

impl LevelStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LevelStatus::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Playing => "playing",
            LevelStatus::Won => "won",
            LevelStatus::Failed(_) => "failed",
        }
    }
}

/// Signals emitted by a level for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LevelEvent {
    /// A hole left the board and is flying to a container.
    HoleMoved { hole: HoleId, container: ContainerId },
    /// A mystery hole left the board and its colour became visible.
    HoleRevealed { hole: HoleId, color: HoleColor },
    /// A hole landed in its container.
    HolePlaced { hole: HoleId, container: ContainerId },
    /// A grouped partner is waiting for a free container.
    PartnerQueued { hole: HoleId },
    /// A car started driving towards a container.
    CarDispatched {
        car: CarId,
        container: ContainerId,
        fallback: bool,
    },
    /// A car reached its container and is falling into the hole.
    CarDelivered { car: CarId, container: ContainerId },
    /// A fallback car ran into another car and drives back.
    CarBumped { car: CarId },
    /// A bumped car is parked again.
    CarReturned { car: CarId },
    /// A container was emptied after its car fell in.
    HoleCleared { hole: HoleId, container: ContainerId },
    /// A car left the pool.
    CarRemoved { car: CarId },
    /// A tap could not find an empty container.
    NoSpaceAvailable,
    /// The countdown crossed the warning threshold.
    TimerWarning { remaining_secs: u32 },
    LevelFailed { reason: FailReason },
    LevelWon,
}

/// Player-facing actions, shared by keyboard input and the AI protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    CursorLeft,
    CursorRight,
    /// Tap the front hole of the column under the cursor.
    Tap,
    /// Tap the front hole of a column by index.
    TapColumn(u8),
    Restart,
    NextLevel,
}

impl GameAction {
    /// Parse an action name (case-insensitive). Column taps carry data and are
    /// not reachable through this function.
    ///
    /// ```
    /// use hole_match_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("Left"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("next"), Some(GameAction::NextLevel));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(GameAction::CursorLeft),
            "right" => Some(GameAction::CursorRight),
            "tap" => Some(GameAction::Tap),
            "restart" => Some(GameAction::Restart),
            "next" | "nextlevel" => Some(GameAction::NextLevel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorLeft => "left",
            GameAction::CursorRight => "right",
            GameAction::Tap | GameAction::TapColumn(_) => "tap",
            GameAction::Restart => "restart",
            GameAction::NextLevel => "next",
        }
    }
}
