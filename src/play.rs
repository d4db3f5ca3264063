//! Applying player and remote actions to a session.

use thiserror::Error;

use crate::adapter::{ErrorCode, InboundCommand, OutboundMessage};
use crate::core::{LevelDataError, MoveError, ProgressStore, Session};
use crate::input::ColumnCursor;
use crate::types::GameAction;

/// Why an action had no effect.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error("could not load level: {0}")]
    Load(#[from] LevelDataError),
}

impl ActionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ActionError::Move(MoveError::NotEligible) => ErrorCode::NotEligible,
            ActionError::Move(MoveError::NoContainerAvailable) => ErrorCode::NoContainer,
            ActionError::Move(MoveError::LevelOver) => ErrorCode::LevelOver,
            ActionError::Load(_) => ErrorCode::LevelLoadFailed,
        }
    }
}

/// Apply one action from the keyboard or the adapter.
pub fn apply_action<P: ProgressStore>(
    session: &mut Session<P>,
    cursor: &mut ColumnCursor,
    action: GameAction,
) -> Result<(), ActionError> {
    let columns = column_count(session);
    match action {
        GameAction::CursorLeft => cursor.left(),
        GameAction::CursorRight => cursor.right(columns),
        GameAction::Tap => {
            session.tap_column(cursor.column())?;
        }
        GameAction::TapColumn(column) => {
            cursor.select(usize::from(column), columns);
            session.tap_column(usize::from(column))?;
        }
        GameAction::Restart => {
            session.restart()?;
            cursor.clamp(column_count(session));
        }
        GameAction::NextLevel => {
            session.next_level()?;
            cursor.clamp(column_count(session));
        }
    }
    Ok(())
}

/// Apply a command from the adapter and build its reply.
pub fn apply_remote<P: ProgressStore>(
    session: &mut Session<P>,
    cursor: &mut ColumnCursor,
    cmd: InboundCommand,
) -> OutboundMessage {
    match apply_action(session, cursor, cmd.action) {
        Ok(()) => OutboundMessage::Ack {
            client_id: cmd.client_id,
            seq: cmd.seq,
        },
        Err(e) => {
            if let ActionError::Load(err) = &e {
                log::error!("level load requested by client {} failed: {err}", cmd.client_id);
            }
            OutboundMessage::Error {
                client_id: cmd.client_id,
                seq: cmd.seq,
                code: e.code(),
                message: e.to_string(),
            }
        }
    }
}

pub fn column_count<P: ProgressStore>(session: &Session<P>) -> usize {
    session.level().map_or(0, |level| level.board().column_count())
}
