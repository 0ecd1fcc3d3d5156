//! Error types for the board, settings store and controller handle.

use crate::types::Position;
use derive_more::{Display, Error};
use tracing::instrument;

/// Error raised by board access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BoardError {
    /// The cell already holds a symbol.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(Position),

    /// Coordinates outside the board.
    #[display("Position ({row}, {col}) is outside the board")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

impl std::error::Error for BoardError {}

/// What went wrong while loading or storing settings.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SettingsErrorKind {
    /// Settings file could not be read.
    #[display("read failed: {}", _0)]
    Read(String),
    /// Settings file is not valid TOML for [`crate::Settings`].
    #[display("parse failed: {}", _0)]
    Parse(String),
    /// Settings could not be rendered as TOML.
    #[display("serialize failed: {}", _0)]
    Serialize(String),
    /// Settings file could not be written.
    #[display("write failed: {}", _0)]
    Write(String),
    /// Turn duration outside the accepted range.
    #[display("turn duration of {} seconds is outside 1-60", _0)]
    InvalidDuration(u32),
}

/// Settings error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Settings error: {} at {}:{}", kind, file, line)]
pub struct SettingsError {
    /// Error kind.
    pub kind: SettingsErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SettingsError {
    /// Creates a new settings error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SettingsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Error returned by [`crate::GameHandle`] and the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// The controller task has stopped and no longer accepts commands.
    #[display("Game controller is no longer running")]
    ControllerGone,
}
