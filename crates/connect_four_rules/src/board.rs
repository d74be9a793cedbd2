//! Board geometry and piece placement.

use super::action::MoveError;
use super::types::{Cell, Player};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Width and height of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    /// Number of columns.
    pub width: u8,
    /// Number of rows.
    pub height: u8,
}

impl BoardSize {
    /// Classic 7 x 6 board.
    pub const STANDARD: BoardSize = BoardSize {
        width: 7,
        height: 6,
    };

    /// Smallest side length on which four can be connected.
    pub const MIN_SIDE: u8 = 4;

    /// Largest side length accepted for a game.
    pub const MAX_SIDE: u8 = 16;

    /// Creates a board size.
    pub fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    /// Returns true when both sides lie within `[MIN_SIDE, MAX_SIDE]`.
    pub fn is_playable(&self) -> bool {
        (Self::MIN_SIDE..=Self::MAX_SIDE).contains(&self.width)
            && (Self::MIN_SIDE..=Self::MAX_SIDE).contains(&self.height)
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A Connect Four board.
///
/// Cells are stored row-major with row 0 at the bottom. Boards are values:
/// [`Board::apply`] returns a new board and never touches the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: BoardSize,
    cells: Vec<Cell>,
    last_mover: Option<Player>,
    pieces: usize,
}

impl Board {
    /// Creates a board with every cell empty.
    #[instrument]
    pub fn empty(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size.cells()],
            last_mover: None,
            pieces: 0,
        }
    }

    /// Returns the board geometry.
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.size.width as usize
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.size.height as usize
    }

    /// Returns the cell at `column`, `row` (row 0 is the bottom).
    pub fn get(&self, column: usize, row: usize) -> Option<Cell> {
        if column >= self.width() || row >= self.height() {
            return None;
        }
        self.cells.get(row * self.width() + column).copied()
    }

    /// Returns the player who placed the most recent piece.
    pub fn last_mover(&self) -> Option<Player> {
        self.last_mover
    }

    /// Number of pieces on the board.
    pub fn pieces(&self) -> usize {
        self.pieces
    }

    /// Lowest empty row of a column, or `None` if the column is full.
    pub fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        (0..self.height()).find(|&row| self.get(column, row) == Some(Cell::Empty))
    }

    /// Returns true if the column cannot take another piece.
    pub fn is_column_full(&self, column: usize) -> bool {
        self.lowest_empty_row(column).is_none()
    }

    /// Columns that still accept a piece, left to right.
    pub fn playable_columns(&self) -> Vec<usize> {
        (0..self.width())
            .filter(|&column| !self.is_column_full(column))
            .collect()
    }

    /// Drops a piece for `player` into `column`, returning the new board.
    ///
    /// # Errors
    ///
    /// - [`MoveError::ColumnOutOfBounds`] if `column` is outside `[0, width)`.
    /// - [`MoveError::ColumnFull`] if the column has no empty cell.
    #[instrument(skip(self), fields(board = %self.size))]
    pub fn apply(&self, player: Player, column: i32) -> Result<Board, MoveError> {
        let index = usize::try_from(column)
            .ok()
            .filter(|&c| c < self.width())
            .ok_or(MoveError::ColumnOutOfBounds {
                column,
                width: self.size.width,
            })?;

        let row = self
            .lowest_empty_row(index)
            .ok_or(MoveError::ColumnFull { column })?;

        let mut next = self.clone();
        next.cells[row * self.width() + index] = Cell::Occupied(player);
        next.last_mover = Some(player);
        next.pieces += 1;
        trace!(column, row, ?player, "Piece placed");
        Ok(next)
    }

    /// Formats the board as plain text, top row first.
    ///
    /// Empty cells are `.`, player one is `X`, player two is `O`. Column
    /// indices are printed underneath.
    pub fn render(&self) -> String {
        let mut result = String::new();
        for row in (0..self.height()).rev() {
            let line: Vec<String> = (0..self.width())
                .map(|column| match self.get(column, row) {
                    Some(Cell::Occupied(player)) => player.symbol().to_string(),
                    _ => ".".to_string(),
                })
                .collect();
            result.push_str(&line.join(" "));
            result.push('\n');
        }
        let footer: Vec<String> = (0..self.width()).map(|c| (c % 10).to_string()).collect();
        result.push_str(&footer.join(" "));
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(BoardSize::STANDARD)
    }
}
