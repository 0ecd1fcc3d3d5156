//! Events sent from the controller to presentation collaborators.

use crate::board::Line;
use crate::players::Player;
use crate::types::Position;

/// Audio cue requested by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AudioCue {
    /// A symbol was drawn.
    Symbol,
    /// A game control was used (undo, hint, restart).
    ButtonClick,
    /// A game ended with a winner.
    GameOver,
}

/// Messages sent from the controller to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new game started with these players.
    PlayersAssigned {
        /// Always-human first slot.
        first: Player,
        /// Second slot, human or computer.
        second: Player,
    },
    /// The turn passed to `player`.
    TurnChanged {
        /// Player now on turn.
        player: Player,
    },
    /// Share of the turn time used by `player`.
    TimerProgress {
        /// Player whose time is running.
        player: Player,
        /// Elapsed fraction in `[0, 1]`.
        fraction: f32,
    },
    /// A symbol landed on the board.
    MovePlayed {
        /// Player who moved.
        player: Player,
        /// Cell played.
        position: Position,
    },
    /// The last move was taken back.
    MoveUndone {
        /// Cell cleared.
        position: Position,
    },
    /// A suggested free cell.
    Hint {
        /// Suggested cell.
        position: Position,
    },
    /// Play this sound. Only sent when audio is enabled.
    Sound(AudioCue),
    /// The game ended.
    GameOver {
        /// Winner, or `None` for a draw.
        winner: Option<Player>,
        /// The loser ran out of time.
        by_timeout: bool,
        /// Completed line when won on the board.
        winning_line: Option<Line>,
    },
}
