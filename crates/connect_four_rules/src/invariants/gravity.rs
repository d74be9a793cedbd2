//! Gravity invariant: pieces rest on the bottom or on another piece.

use super::super::{Cell, Replay};
use super::Invariant;

/// Invariant: No occupied cell sits above an empty one.
pub struct GravityInvariant;

impl Invariant<Replay> for GravityInvariant {
    fn holds(state: &Replay) -> bool {
        let board = state.board();
        (0..board.width()).all(|column| {
            let mut seen_empty = false;
            (0..board.height()).all(|row| match board.get(column, row) {
                Some(Cell::Empty) => {
                    seen_empty = true;
                    true
                }
                Some(Cell::Occupied(_)) => !seen_empty,
                None => false,
            })
        })
    }

    fn description() -> &'static str {
        "Pieces rest on the bottom row or on another piece"
    }
}
