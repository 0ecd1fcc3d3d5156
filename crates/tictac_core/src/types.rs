//! Core domain types: symbols and board coordinates.

use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side length of the square board.
pub const BOARD_SIZE: usize = 3;

/// Number of cells on the board.
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Mark placed on the board by a player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Symbol {
    /// Cross. The player holding it always moves first.
    X,
    /// Nought.
    O,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// Zero-indexed (row, column) address of a cell.
///
/// A `Position` can only be built inside the board bounds, so every
/// board access through it is in range. The default is the top-left cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[display("({row}, {col})")]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    /// Creates a position, rejecting coordinates off the board.
    pub fn new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Row-major index (0-8).
    pub fn index(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// Creates position from a row-major index.
    #[instrument]
    pub fn from_index(index: usize) -> Option<Self> {
        (index < SQUARE_COUNT).then(|| Self::at(index / BOARD_SIZE, index % BOARD_SIZE))
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..SQUARE_COUNT).map(|index| Self::at(index / BOARD_SIZE, index % BOARD_SIZE))
    }

    // Callers guarantee both coordinates are below BOARD_SIZE.
    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}
