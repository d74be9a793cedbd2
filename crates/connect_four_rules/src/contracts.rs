//! Contract-based validation for Connect Four.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::action::{MoveError, MoveType, Play};
use super::invariants::{InvariantSet, ReplayInvariants};
use super::replay::Replay;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: Nobody has won and the board is not full.
pub struct GameNotOver;

impl GameNotOver {
    /// Checks the game outcome.
    #[instrument(skip(state))]
    pub fn check(state: &Replay) -> Result<(), MoveError> {
        if state.outcome().is_over() {
            Err(MoveError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: It must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Checks the play's seat against the seat to move.
    #[instrument(skip(state))]
    pub fn check(play: &Play, state: &Replay) -> Result<(), MoveError> {
        let expected = *state.next_to_move();
        if play.player != expected {
            Err(MoveError::OutOfTurn {
                mover: play.player.to_string(),
                expected: expected.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: The move must fit on the board.
///
/// Delegates to [`crate::Board::apply`] so validation and replay can never
/// disagree on geometry.
pub struct MoveFits;

impl MoveFits {
    /// Checks the move against the current board.
    #[instrument(skip(state))]
    pub fn check(play: &Play, state: &Replay) -> Result<(), MoveError> {
        match play.move_type {
            MoveType::DropPiece { column } => {
                state.board().apply(play.player, column).map(|_| ())
            }
        }
    }
}

/// Composite precondition, checked in order:
/// game not over, player's turn, move fits.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(state))]
    pub fn check(play: &Play, state: &Replay) -> Result<(), MoveError> {
        GameNotOver::check(state)?;
        PlayersTurn::check(play, state)?;
        MoveFits::check(play, state)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for plays.
///
/// Preconditions:
/// - Game is not over
/// - Must be player's turn
/// - Column exists and has room
///
/// Postconditions:
/// - Pieces obey gravity
/// - Seats alternate from the opening seat
/// - History is consistent with the board
pub struct MoveContract;

impl Contract<Replay, Play> for MoveContract {
    fn pre(state: &Replay, action: &Play) -> Result<(), MoveError> {
        LegalMove::check(action, state)
    }

    fn post(_before: &Replay, after: &Replay) -> Result<(), MoveError> {
        ReplayInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Postcondition failed");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
