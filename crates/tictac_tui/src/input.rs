//! Keyboard mapping and cursor movement.

use crossterm::event::KeyCode;
use tictac_core::{BOARD_SIZE, PlayerKind, Position};

/// Cursor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor one cell.
    Cursor(Direction),
    /// Click the cell under the cursor.
    PlaceAtCursor,
    /// Click a cell picked from the keypad.
    PlaceAt(Position),
    /// Take back the last move.
    Undo,
    /// Highlight a free cell.
    Hint,
    /// Start a new game against the given opponent.
    NewGame(PlayerKind),
    /// Open the settings panel.
    OpenSettings,
    /// Flip audio cues.
    ToggleAudio,
    /// Flip the turn timer.
    ToggleTimer,
    /// Change seconds per turn by the given amount.
    StepSeconds(i32),
    /// Save the settings and close the panel.
    CloseSettings,
    /// Leave the application.
    Quit,
}

/// Maps a key to an action. Digits 1-9 address cells row-major.
///
/// While the settings panel is open only settings keys and quit apply.
pub fn action_for(key: KeyCode, settings_open: bool) -> Option<Action> {
    if settings_open {
        return settings_action(key);
    }
    let action = match key {
        KeyCode::Up => Action::Cursor(Direction::Up),
        KeyCode::Down => Action::Cursor(Direction::Down),
        KeyCode::Left => Action::Cursor(Direction::Left),
        KeyCode::Right => Action::Cursor(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Action::PlaceAtCursor,
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10)? as usize - 1;
            Action::PlaceAt(Position::from_index(index)?)
        }
        KeyCode::Char('u') => Action::Undo,
        KeyCode::Char('h') => Action::Hint,
        KeyCode::Char('n') => Action::NewGame(PlayerKind::Human),
        KeyCode::Char('c') => Action::NewGame(PlayerKind::Computer),
        KeyCode::Char('s') => Action::OpenSettings,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

fn settings_action(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Char('a') => Action::ToggleAudio,
        KeyCode::Char('t') => Action::ToggleTimer,
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right | KeyCode::Up => {
            Action::StepSeconds(1)
        }
        KeyCode::Char('-') | KeyCode::Left | KeyCode::Down => Action::StepSeconds(-1),
        KeyCode::Char('s') | KeyCode::Enter | KeyCode::Esc => Action::CloseSettings,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Moves the cursor, stopping at the board edges.
pub fn move_cursor(cursor: Position, direction: Direction) -> Position {
    let (row, col) = (cursor.row(), cursor.col());
    let last = BOARD_SIZE - 1;
    let (row, col) = match direction {
        Direction::Up => (row.saturating_sub(1), col),
        Direction::Down => ((row + 1).min(last), col),
        Direction::Left => (row, col.saturating_sub(1)),
        Direction::Right => (row, (col + 1).min(last)),
    };
    Position::new(row, col).unwrap_or(cursor)
}
