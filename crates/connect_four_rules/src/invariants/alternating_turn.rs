//! Alternating turn invariant: seats alternate starting with the opening seat.

use super::super::{Player, Replay};
use super::Invariant;

/// Invariant: Seats alternate turns.
///
/// The first play belongs to [`Player::OPENING`], every later play to the
/// other seat than its predecessor, and `next_to_move` continues the pattern.
pub struct AlternatingTurnInvariant;

impl Invariant<Replay> for AlternatingTurnInvariant {
    fn holds(state: &Replay) -> bool {
        let history = state.history();

        let alternates = history
            .iter()
            .enumerate()
            .all(|(i, play)| play.player == Player::to_move_after(i));

        alternates && *state.next_to_move() == Player::to_move_after(history.len())
    }

    fn description() -> &'static str {
        "Seats alternate turns starting with the invited opponent"
    }
}
