//! First-class action types for Connect Four.
//!
//! Moves are domain events, not side effects. They represent
//! the player's intent and can be validated independently of execution.

use super::Player;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The kinds of move a player can make.
///
/// The set is closed; new kinds are added as variants and must be matched
/// explicitly wherever moves are applied or validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// Drop a piece into a column. It falls to the lowest empty row.
    DropPiece {
        /// Zero-based column index, counted from the left.
        column: i32,
    },
}

impl MoveType {
    /// Returns one example of every move variant.
    pub fn describe() -> Vec<MoveType> {
        vec![MoveType::DropPiece { column: 0 }]
    }
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveType::DropPiece { column } => write!(f, "drop piece in column {}", column),
        }
    }
}

/// A move attributed to a seat, as consumed by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Play {
    /// The seat making the move.
    pub player: Player,
    /// What the seat does.
    pub move_type: MoveType,
}

impl Play {
    /// Creates a new play.
    #[instrument]
    pub fn new(player: Player, move_type: MoveType) -> Self {
        Self { player, move_type }
    }

    /// Shorthand for a piece drop.
    pub fn drop_piece(player: Player, column: i32) -> Self {
        Self::new(player, MoveType::DropPiece { column })
    }
}

impl std::fmt::Display for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.player, self.move_type)
    }
}

/// Rule violation detected while validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The column lies outside `[0, width)`.
    #[display("Column {column} is out of bounds (board has {width} columns)")]
    ColumnOutOfBounds {
        /// Requested column.
        column: i32,
        /// Board width.
        width: u8,
    },

    /// The column has no empty cell left.
    #[display("Column {column} is full")]
    ColumnFull {
        /// Requested column.
        column: i32,
    },

    /// The game has already been won or drawn.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// It is not this player's turn.
    #[display("It's not {mover}'s turn, {expected} must move")]
    OutOfTurn {
        /// Who tried to move.
        mover: String,
        /// Who should move.
        expected: String,
    },

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}
