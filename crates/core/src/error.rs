//! Error types for the matching core.

use thiserror::Error;

use crate::hole::Hole;
use crate::types::ContainerId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("column {0} does not exist")]
    UnknownColumn(usize),
    #[error("column {0} is empty")]
    EmptyColumn(usize),
}

/// A rejected placement. The hole is handed back so the caller keeps
/// ownership of it.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container {container} does not exist")]
    UnknownContainer {
        container: ContainerId,
        rejected: Box<Hole>,
    },
    #[error("container {container} already holds a hole")]
    AlreadyOccupied {
        container: ContainerId,
        rejected: Box<Hole>,
    },
}

impl ContainerError {
    pub fn into_rejected(self) -> Hole {
        match self {
            ContainerError::UnknownContainer { rejected, .. }
            | ContainerError::AlreadyOccupied { rejected, .. } => *rejected,
        }
    }
}

/// Reasons a tap does not move anything.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The hole is not at the front of a column, or the column is empty.
    #[error("hole is not eligible to move")]
    NotEligible,
    #[error("no empty container available")]
    NoContainerAvailable,
    /// The level has already been won or lost.
    #[error("level is over")]
    LevelOver,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelDataError {
    #[error("level has no columns")]
    NoColumns,
    #[error("level needs at least one container")]
    NoContainers,
    #[error("level has no cars")]
    NoCars,
    #[error("timed level needs a positive time limit")]
    ZeroTimeLimit,
    #[error("level catalog is empty")]
    EmptyCatalog,
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress data is malformed: {0}")]
    Format(String),
}
