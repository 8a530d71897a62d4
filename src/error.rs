//! Domain error kinds for match operations.

use derive_more::{Display, Error};

use crate::db::DbError;
use crate::games::maze::Position;

/// Error raised by a match operation.
///
/// Game-logic rejections (bounds, obstacle, step shape, finished, unknown or
/// malformed ids, bad init input) are expected outcomes and are reported to
/// the caller as-is. Persistence and unexpected failures carry internal
/// detail that must only reach the logs.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum GameError {
    /// Grid side outside the supported range.
    #[display("Grid size {} is outside the supported range {}..={}", size, min, max)]
    InvalidDimension {
        /// Requested side.
        size: i64,
        /// Smallest accepted side.
        min: usize,
        /// Largest accepted side.
        max: usize,
    },

    /// Player name empty or too long.
    #[display("Player name must be between 1 and {} characters", max)]
    InvalidPlayerName {
        /// Longest accepted name.
        max: usize,
    },

    /// An identifier that is not a UUID.
    #[display("'{}' is not a valid identifier", _0)]
    InvalidIdFormat(#[error(not(source))] String),

    /// No match with this identifier.
    #[display("Match {} not found", _0)]
    NotFound(#[error(not(source))] String),

    /// Target outside the grid.
    #[display("Position {} is outside the maze", _0)]
    OutOfBounds(#[error(not(source))] Position),

    /// Target cell is a wall.
    #[display("Position {} is blocked by an obstacle", _0)]
    Obstacle(#[error(not(source))] Position),

    /// Not a single orthogonal step.
    #[display("Illegal move from {} to {}: moves must be one step up, down, left or right", from, to)]
    IllegalStep {
        /// Current position.
        from: Position,
        /// Requested target.
        to: Position,
    },

    /// The match already reached the goal.
    #[display("Match already finished")]
    AlreadyFinished,

    /// The store could not read or write the record.
    #[display("Persistence failure: {}", _0)]
    PersistenceFailure(#[error(not(source))] String),

    /// Anything else.
    #[display("Unexpected error: {}", _0)]
    Unexpected(#[error(not(source))] String),
}

/// Discriminant of [`GameError`], used for logging and response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GameErrorKind {
    /// See [`GameError::InvalidDimension`].
    InvalidDimension,
    /// See [`GameError::InvalidPlayerName`].
    InvalidPlayerName,
    /// See [`GameError::InvalidIdFormat`].
    InvalidIdFormat,
    /// See [`GameError::NotFound`].
    NotFound,
    /// See [`GameError::OutOfBounds`].
    OutOfBounds,
    /// See [`GameError::Obstacle`].
    Obstacle,
    /// See [`GameError::IllegalStep`].
    IllegalStep,
    /// See [`GameError::AlreadyFinished`].
    AlreadyFinished,
    /// See [`GameError::PersistenceFailure`].
    PersistenceFailure,
    /// See [`GameError::Unexpected`].
    Unexpected,
}

impl GameError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> GameErrorKind {
        match self {
            Self::InvalidDimension { .. } => GameErrorKind::InvalidDimension,
            Self::InvalidPlayerName { .. } => GameErrorKind::InvalidPlayerName,
            Self::InvalidIdFormat(_) => GameErrorKind::InvalidIdFormat,
            Self::NotFound(_) => GameErrorKind::NotFound,
            Self::OutOfBounds(_) => GameErrorKind::OutOfBounds,
            Self::Obstacle(_) => GameErrorKind::Obstacle,
            Self::IllegalStep { .. } => GameErrorKind::IllegalStep,
            Self::AlreadyFinished => GameErrorKind::AlreadyFinished,
            Self::PersistenceFailure(_) => GameErrorKind::PersistenceFailure,
            Self::Unexpected(_) => GameErrorKind::Unexpected,
        }
    }

    /// True for failures whose message is safe and useful to show a player.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::PersistenceFailure(_) | Self::Unexpected(_))
    }

    /// Message for the caller. Internal failures collapse to a generic text.
    pub fn public_message(&self) -> String {
        if self.is_rejection() {
            self.to_string()
        } else {
            "The server could not process the request. Please try again.".to_string()
        }
    }
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        Self::PersistenceFailure(err.to_string())
    }
}

impl From<tokio::task::JoinError> for GameError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Unexpected(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn errors_have_no_source() {
        let errors = [
            GameError::NotFound("abc".to_string()),
            GameError::OutOfBounds(Position::new(9, 9)),
            GameError::PersistenceFailure("locked".to_string()),
        ];
        for err in errors {
            assert!(err.source().is_none());
        }
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = GameError::PersistenceFailure("database is locked".to_string());
        assert!(!err.is_rejection());
        assert!(!err.public_message().contains("locked"));

        let err = GameError::Obstacle(Position::new(1, 1));
        assert!(err.is_rejection());
        assert_eq!(err.public_message(), "Position (1, 1) is blocked by an obstacle");
    }
}
