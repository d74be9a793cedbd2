//! Draw detection logic for Connect Four.

use super::super::Board;
use super::win::winner;
use tracing::instrument;

/// Checks if no column can take another piece.
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    (0..board.width()).all(|column| board.is_column_full(column))
}

/// Checks if the board is full and nobody connected four.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winner(board).is_none()
}
