//! Error types for game creation and move validation.

use crate::entry::{AgentId, EntryHash};
use crate::store::StoreError;
use connect_four_rules::{BoardSize, MoveError};
use derive_more::Display;

/// Why a candidate move was rejected.
///
/// Nothing is written to the store when a move is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ValidationError {
    /// The move names a game that does not resolve to a game entry.
    #[display("Unknown game {}", _0)]
    UnknownGame(EntryHash),

    /// The move's parent is not part of the game's accepted history.
    #[display("Unknown parent move {}", _0)]
    UnknownParent(EntryHash),

    /// Another move already extends the parent; resubmit against the tip.
    #[display("Parent is no longer the tip of the game (tip is {})", tip.map(|t| t.to_hex()).unwrap_or_else(|| "the game root".to_string()))]
    StaleParent {
        /// Current canonical tip, `None` when the game has no moves.
        tip: Option<EntryHash>,
    },

    /// The move breaks a game rule.
    #[display("{}", _0)]
    Rule(MoveError),

    /// The store could not be used.
    #[display("{}", _0)]
    StoreUnavailable(StoreError),
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidationError::Rule(e) => Some(e),
            ValidationError::StoreUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl ValidationError {
    /// Returns true if the same request can succeed once the store recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValidationError::StoreUnavailable(e) if e.is_retryable())
    }

    /// The rule broken, if this is a rule violation.
    pub fn rule(&self) -> Option<&MoveError> {
        match self {
            ValidationError::Rule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for ValidationError {
    fn from(err: MoveError) -> Self {
        ValidationError::Rule(err)
    }
}

impl From<StoreError> for ValidationError {
    fn from(err: StoreError) -> Self {
        ValidationError::StoreUnavailable(err)
    }
}

/// Why a game could not be created or read.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameError {
    /// The opponent is the creator.
    #[display("Cannot start a game against yourself ({})", opponent)]
    InvalidOpponent {
        /// Agent named as opponent.
        opponent: AgentId,
    },

    /// The board geometry is outside the playable range.
    #[display("Board size {} is not playable (sides must be {}..={})", size, BoardSize::MIN_SIDE, BoardSize::MAX_SIDE)]
    InvalidBoardSize {
        /// Rejected size.
        size: BoardSize,
    },

    /// The hash does not resolve to a game entry.
    #[display("Unknown game {}", _0)]
    UnknownGame(EntryHash),

    /// The store could not be used.
    #[display("{}", _0)]
    StoreUnavailable(StoreError),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::StoreUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl GameError {
    /// Returns true if the same request can succeed once the store recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::StoreUnavailable(e) if e.is_retryable())
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        GameError::StoreUnavailable(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_outages() {
        let outage = StoreError::Unavailable("down".into());
        assert!(ValidationError::from(outage.clone()).is_retryable());
        assert!(GameError::from(outage).is_retryable());

        let codec = StoreError::Codec("garbage".into());
        assert!(!ValidationError::from(codec).is_retryable());
        assert!(!ValidationError::from(MoveError::GameAlreadyOver).is_retryable());
        assert!(!ValidationError::StaleParent { tip: None }.is_retryable());
    }

    #[test]
    fn test_rule_accessor() {
        let err = ValidationError::from(MoveError::ColumnFull { column: 2 });
        assert_eq!(err.rule(), Some(&MoveError::ColumnFull { column: 2 }));
        assert_eq!(ValidationError::StaleParent { tip: None }.rule(), None);
    }

    #[test]
    fn test_stale_parent_message_names_root() {
        let err = ValidationError::StaleParent { tip: None };
        assert!(err.to_string().contains("the game root"));
    }
}
