//! History consistency invariant: history length matches pieces on the board.

use super::super::{Cell, Replay};
use super::Invariant;

/// Invariant: Every play in the history left exactly one piece on the board.
pub struct HistoryConsistentInvariant;

impl Invariant<Replay> for HistoryConsistentInvariant {
    fn holds(state: &Replay) -> bool {
        let board = state.board();
        let occupied = (0..board.width())
            .flat_map(|column| (0..board.height()).map(move |row| (column, row)))
            .filter(|&(column, row)| matches!(board.get(column, row), Some(Cell::Occupied(_))))
            .count();

        occupied == state.len() && board.pieces() == state.len()
    }

    fn description() -> &'static str {
        "History length matches number of pieces on the board"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardSize, Play, Player, replay};

    #[test]
    fn test_empty_game_holds() {
        assert!(HistoryConsistentInvariant::holds(&Replay::start(
            BoardSize::STANDARD
        )));
    }

    #[test]
    fn test_multiple_moves_hold() {
        let plays: Vec<Play> = (0..8)
            .map(|i| Play::drop_piece(Player::to_move_after(i), (i % 7) as i32))
            .collect();
        let state = replay(BoardSize::STANDARD, &plays).unwrap();
        assert!(HistoryConsistentInvariant::holds(&state));
        assert_eq!(state.len(), 8);
    }
}
