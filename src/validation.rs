//! Validation engine.
//!
//! A candidate move is checked in a fixed order so every peer reports the
//! same error for the same candidate:
//!
//! 1. the game exists and the parent is an accepted move (or the root)
//! 2. the parent is the current tip
//! 3. the game is not over
//! 4. the author holds the seat to move
//! 5. the move type is supported and the column accepts a piece

use crate::chain::CanonicalChain;
use crate::entry::{GameEntry, MoveEntry};
use crate::error::{GameError, ValidationError};
use crate::store::ContentStore;
use connect_four_rules::{GameNotOver, MoveError, MoveType, Play, Replay};
use derive_getters::Getters;
use tracing::{debug, instrument, warn};

/// A candidate that passed validation, with the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AcceptedMove {
    /// History the candidate extends.
    chain: CanonicalChain,
    /// Replay state once the candidate is applied.
    state: Replay,
}

/// Checks a game entry before it is published.
///
/// # Errors
///
/// - [`GameError::InvalidOpponent`] if both seats name the same agent
/// - [`GameError::InvalidBoardSize`] if a side is outside the playable range
#[instrument(skip(game), fields(player_one = %game.player_one(), player_two = %game.player_two()))]
pub fn validate_game(game: &GameEntry) -> Result<(), GameError> {
    if game.player_one() == game.player_two() {
        return Err(GameError::InvalidOpponent {
            opponent: game.player_two().clone(),
        });
    }
    if !game.board().is_playable() {
        return Err(GameError::InvalidBoardSize {
            size: *game.board(),
        });
    }
    Ok(())
}

/// Applies the rule checks to a candidate whose parent is already known to
/// be the tip of `state`.
///
/// # Errors
///
/// Returns the first broken rule: game over, out of turn, then geometry.
#[instrument(skip_all, fields(author = %candidate.author(), moves = state.len()))]
pub fn check_successor(
    game: &GameEntry,
    state: &Replay,
    candidate: &MoveEntry,
) -> Result<Replay, MoveError> {
    GameNotOver::check(state)?;

    let Some(seat) = game.seat_of(candidate.author()) else {
        warn!("Author does not play in this game");
        return Err(MoveError::OutOfTurn {
            mover: candidate.author().to_string(),
            expected: game.agent_for(*state.next_to_move()).to_string(),
        });
    };

    let play = match *candidate.move_type() {
        MoveType::DropPiece { column } => Play::drop_piece(seat, column),
    };

    state.advance(play).map_err(|e| match e {
        MoveError::OutOfTurn { .. } => MoveError::OutOfTurn {
            mover: candidate.author().to_string(),
            expected: game.agent_for(*state.next_to_move()).to_string(),
        },
        other => other,
    })
}

/// Validates a candidate move against the store.
///
/// # Errors
///
/// - [`ValidationError::UnknownGame`], [`ValidationError::UnknownParent`]
///   or [`ValidationError::StaleParent`] for history problems
/// - [`ValidationError::Rule`] for rule violations
/// - [`ValidationError::StoreUnavailable`] if the store fails
#[instrument(skip_all, fields(game = %candidate.game().short(), author = %candidate.author()))]
pub async fn validate_move<S>(
    store: &S,
    candidate: &MoveEntry,
) -> Result<AcceptedMove, ValidationError>
where
    S: ContentStore + ?Sized,
{
    let chain = CanonicalChain::resolve(store, candidate.game()).await?;
    validate_on_chain(chain, candidate)
}

/// Validates a candidate against an already resolved chain of its game.
///
/// # Errors
///
/// Same as [`validate_move`], except for store failures.
#[instrument(skip_all, fields(game = %chain.game_id().short(), author = %candidate.author()))]
pub fn validate_on_chain(
    chain: CanonicalChain,
    candidate: &MoveEntry,
) -> Result<AcceptedMove, ValidationError> {
    chain.check_parent(*candidate.previous_move())?;
    let state = check_successor(chain.game(), chain.state(), candidate)?;
    debug!(outcome = %state.outcome(), "Candidate accepted");
    Ok(AcceptedMove { chain, state })
}
