//! Deterministic reconstruction of a game from its move history.
//!
//! The reducer is a pure fold over an ordered list of plays. It keeps no
//! state between calls, so every peer that feeds it the same causal chain
//! derives the same board, turn and outcome.

use super::action::{MoveError, MoveType, Play};
use super::board::{Board, BoardSize};
use super::contracts::{Contract, MoveContract};
use super::rules;
use super::types::{Outcome, Player};
use derive_getters::Getters;
use tracing::{debug, instrument};

/// Board and turn state derived from a move history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct Replay {
    /// Board after the last applied move.
    board: Board,
    /// Seat that moves next.
    next_to_move: Player,
    /// Whether the game is still running.
    outcome: Outcome,
    /// Plays applied so far, in causal order.
    history: Vec<Play>,
}

impl Replay {
    /// State of a game before any move.
    #[instrument]
    pub fn start(size: BoardSize) -> Self {
        Self {
            board: Board::empty(size),
            next_to_move: Player::OPENING,
            outcome: Outcome::InProgress,
            history: Vec::new(),
        }
    }

    /// Applies a play without checking turn order or game end.
    ///
    /// Only the board geometry is enforced; the caller vouches for the order.
    ///
    /// # Errors
    ///
    /// Propagates [`MoveError::ColumnOutOfBounds`] and [`MoveError::ColumnFull`].
    #[instrument(skip(self), fields(moves = self.history.len()))]
    pub fn step(&self, play: Play) -> Result<Replay, MoveError> {
        let board = match play.move_type {
            MoveType::DropPiece { column } => self.board.apply(play.player, column)?,
        };

        let outcome = if let Some(winner) = rules::winner(&board) {
            Outcome::Won(winner)
        } else if rules::is_full(&board) {
            Outcome::Draw
        } else {
            Outcome::InProgress
        };

        let mut history = self.history.clone();
        history.push(play);

        Ok(Replay {
            board,
            next_to_move: self.next_to_move.opponent(),
            outcome,
            history,
        })
    }

    /// Applies a play after checking it against the move contract.
    ///
    /// Preconditions are always checked; postconditions in debug builds only.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition, see [`MoveContract`].
    #[instrument(skip(self), fields(moves = self.history.len()))]
    pub fn advance(&self, play: Play) -> Result<Replay, MoveError> {
        MoveContract::pre(self, &play)?;
        let next = self.step(play)?;

        #[cfg(debug_assertions)]
        MoveContract::post(self, &next)?;

        Ok(next)
    }

    /// Number of plays applied.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true before the first play.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Folds `plays` in order into a board, next seat and outcome.
///
/// This is the trusting reducer: it alternates turns strictly starting with
/// [`Player::OPENING`] and does not stop at a win. Use [`Replay::advance`]
/// when the plays still need validating.
///
/// # Errors
///
/// Returns a [`MoveError`] if a play does not fit on the board.
#[instrument(skip(plays), fields(plays = plays.len(), board = %size))]
pub fn replay(size: BoardSize, plays: &[Play]) -> Result<Replay, MoveError> {
    let state = plays
        .iter()
        .try_fold(Replay::start(size), |state, play| state.step(*play))?;
    debug!(outcome = %state.outcome, next = %state.next_to_move, "Replayed history");
    Ok(state)
}
