//! Win detection logic for Connect Four.

use super::super::{Board, Cell, Player};
use tracing::{instrument, warn};

/// Length of the run that wins the game.
pub const CONNECT: usize = 4;

/// Directions scanned from every cell: horizontal, vertical and both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has four contiguous pieces in a row,
/// column or diagonal, `None` otherwise. If both players have a run, which
/// turn enforcement makes unreachable, the player who moved last is reported.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Option<Player> {
    let mut found = Vec::with_capacity(2);

    for column in 0..board.width() {
        for row in 0..board.height() {
            let Some(Cell::Occupied(player)) = board.get(column, row) else {
                continue;
            };
            if found.contains(&player) {
                continue;
            }
            if DIRECTIONS
                .iter()
                .any(|&direction| run_from(board, column, row, direction, player))
            {
                found.push(player);
            }
        }
    }

    match found.as_slice() {
        [] => None,
        [player] => Some(*player),
        _ => {
            warn!(
                last_mover = ?board.last_mover(),
                "Both players have four in a row; awarding the last mover"
            );
            board.last_mover().or(found.first().copied())
        }
    }
}

/// Returns true if `CONNECT` cells starting at `column`, `row` in `direction`
/// all belong to `player`.
fn run_from(
    board: &Board,
    column: usize,
    row: usize,
    (dc, dr): (isize, isize),
    player: Player,
) -> bool {
    (0..CONNECT as isize).all(|step| {
        let c = column as isize + dc * step;
        let r = row as isize + dr * step;
        c >= 0 && r >= 0 && board.get(c as usize, r as usize) == Some(Cell::Occupied(player))
    })
}
