//! Core domain types for Connect Four.

use serde::{Deserialize, Serialize};

/// Seat at the table.
///
/// `One` is the agent that created the game, `Two` is the invited opponent.
/// The invited opponent always opens.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Player {
    /// The game creator.
    #[strum(to_string = "player one")]
    One,
    /// The invited opponent (moves first).
    #[strum(to_string = "player two")]
    Two,
}

impl Player {
    /// The seat that makes the first move of every game.
    pub const OPENING: Player = Player::Two;

    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Symbol used when rendering the board.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }

    /// Seat expected to move after `moves_played` moves.
    pub fn to_move_after(moves_played: usize) -> Self {
        if moves_played % 2 == 0 {
            Self::OPENING
        } else {
            Self::OPENING.opponent()
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No piece.
    Empty,
    /// Holds a piece belonging to a player.
    Occupied(Player),
}

impl Cell {
    /// Returns the owner of the piece in this cell, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }
}

/// Outcome of a (possibly unfinished) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Moves are still accepted.
    InProgress,
    /// A player connected four.
    Won(Player),
    /// The board filled up without a winner.
    Draw,
}

impl Outcome {
    /// Returns true once the game has concluded.
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Won(player) => Some(*player),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Won(player) => write!(f, "Won by {}", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
