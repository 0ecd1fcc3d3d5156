//! Authoritative grid state, win/draw detection and move history.

use crate::error::BoardError;
use crate::types::{BOARD_SIZE, Position, Symbol};
use tracing::{debug, instrument, warn};

/// A complete row, column or diagonal.
pub type Line = [Position; BOARD_SIZE];

/// Candidate winning lines in evaluation order: rows, columns,
/// main diagonal, anti-diagonal.
const LINES: [Line; 8] = [
    // Rows
    [Position::at(0, 0), Position::at(0, 1), Position::at(0, 2)],
    [Position::at(1, 0), Position::at(1, 1), Position::at(1, 2)],
    [Position::at(2, 0), Position::at(2, 1), Position::at(2, 2)],
    // Columns
    [Position::at(0, 0), Position::at(1, 0), Position::at(2, 0)],
    [Position::at(0, 1), Position::at(1, 1), Position::at(2, 1)],
    [Position::at(0, 2), Position::at(1, 2), Position::at(2, 2)],
    // Diagonals
    [Position::at(0, 0), Position::at(1, 1), Position::at(2, 2)],
    [Position::at(0, 2), Position::at(1, 1), Position::at(2, 0)],
];

/// 3x3 tic-tac-toe board with an undo stack.
///
/// One board lives for the whole session and is reset between games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE],
    /// Positions played, most recent last.
    history: Vec<Position>,
    /// Line found by the last successful [`Board::check_win`].
    winning_line: Option<Line>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `symbol` at `position` and records it for undo.
    ///
    /// Occupied cells are rejected and leave the board untouched.
    #[instrument(skip(self))]
    pub fn set_symbol(&mut self, symbol: Symbol, position: Position) -> Result<(), BoardError> {
        if let Some(existing) = self.symbol_at(position) {
            warn!(%position, ?existing, "Refusing to overwrite occupied cell");
            return Err(BoardError::CellOccupied(position));
        }
        self.history.push(position);
        self.cells[position.row()][position.col()] = Some(symbol);
        debug!(%position, %symbol, moves = self.history.len(), "Symbol placed");
        Ok(())
    }

    /// Returns the symbol held by a cell.
    pub fn symbol_at(&self, position: Position) -> Option<Symbol> {
        self.cells[position.row()][position.col()]
    }

    /// True if the cell holds any symbol.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.symbol_at(position).is_some()
    }

    /// All empty cells in row-major order.
    pub fn available_positions(&self) -> Vec<Position> {
        Position::all().filter(|pos| !self.is_occupied(*pos)).collect()
    }

    /// True if any cell is empty.
    pub fn has_available_positions(&self) -> bool {
        Position::all().any(|pos| !self.is_occupied(pos))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Returns the first complete line of `symbol`, without recording it.
    pub fn find_winning_line(&self, symbol: Symbol) -> Option<Line> {
        LINES
            .iter()
            .find(|line| line.iter().all(|pos| self.symbol_at(*pos) == Some(symbol)))
            .copied()
    }

    /// True if `symbol` fills a row, column or diagonal.
    ///
    /// On success the line is kept for [`Board::winning_positions`],
    /// replacing any earlier result.
    #[instrument(skip(self))]
    pub fn check_win(&mut self, symbol: Symbol) -> bool {
        match self.find_winning_line(symbol) {
            Some(line) => {
                debug!(%symbol, ?line, "Winning line found");
                self.winning_line = Some(line);
                true
            }
            None => false,
        }
    }

    /// Cells of the most recently detected winning line.
    pub fn winning_positions(&self) -> Option<Line> {
        self.winning_line
    }

    /// Positions played so far, most recent last.
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Pops the most recent move and clears its cell.
    #[instrument(skip(self))]
    pub fn remove_last(&mut self) -> Option<Position> {
        let position = self.history.pop()?;
        self.cells[position.row()][position.col()] = None;
        debug!(%position, moves = self.history.len(), "Move removed");
        Some(position)
    }

    /// Clears every cell, the history and the winning line.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cells = Default::default();
        self.history.clear();
        self.winning_line = None;
        debug!("Board reset");
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or_else(|| ".".to_string(), |s| s.to_string()))
                .collect();
            write!(f, "{}", line.join("|"))?;
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
