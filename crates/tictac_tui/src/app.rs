//! Application state and logic.

use crate::input::{Direction, move_cursor};
use crate::view::{CellUpdate, ViewMessage};
use std::time::{Duration, Instant};
use tictac_core::{GameEvent, Player, Position, SQUARE_COUNT, Settings, Symbol};
use tracing::debug;

/// Pause between a winning move and the result banner.
pub const BANNER_DELAY: Duration = Duration::from_millis(2000);

/// What one cell shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellState {
    pub symbol: Option<Symbol>,
    pub interactable: bool,
    pub highlighted: bool,
    pub winning: bool,
}

/// Label and time gauge of one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPanel {
    pub player: Player,
    pub fraction: f32,
    pub on_turn: bool,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    cells: [CellState; SQUARE_COUNT],
    cursor: Position,
    panels: Vec<PlayerPanel>,
    status_message: String,
    banner: Option<String>,
    pending_banner: Option<(Instant, String)>,
    bell: bool,
    /// Settings being edited while the panel is open.
    settings_draft: Option<Settings>,
}

impl App {
    /// Creates a new application.
    pub fn new() -> Self {
        Self {
            cells: [CellState::default(); SQUARE_COUNT],
            cursor: Position::default(),
            panels: Vec::new(),
            status_message: "Starting game...".to_string(),
            banner: None,
            pending_banner: None,
            bell: false,
            settings_draft: None,
        }
    }

    pub fn cell(&self, position: Position) -> &CellState {
        &self.cells[position.index()]
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn panels(&self) -> &[PlayerPanel] {
        &self.panels
    }

    /// Gets the current status message.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Result banner, once it is due.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        self.cursor = move_cursor(self.cursor, direction);
    }

    pub fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn settings_open(&self) -> bool {
        self.settings_draft.is_some()
    }

    pub fn settings_draft(&self) -> Option<&Settings> {
        self.settings_draft.as_ref()
    }

    /// Opens the settings panel on a copy of `current`.
    pub fn open_settings(&mut self, current: Settings) {
        debug!(?current, "Settings panel opened");
        self.settings_draft = Some(current);
    }

    /// Edits the open draft. Does nothing while the panel is closed.
    pub fn edit_settings(&mut self, edit: impl FnOnce(&mut Settings)) {
        if let Some(draft) = self.settings_draft.as_mut() {
            edit(draft);
        }
    }

    /// Closes the panel and hands back the edited settings.
    pub fn close_settings(&mut self) -> Option<Settings> {
        let draft = self.settings_draft.take()?;
        self.status_message = "Settings saved. They apply from the next game.".to_string();
        Some(draft)
    }

    /// Returns true once per audio cue received since the last call.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Applies a cell update sent by a view.
    pub fn apply_view(&mut self, message: ViewMessage) {
        let cell = &mut self.cells[message.position.index()];
        match message.update {
            CellUpdate::Reset => *cell = CellState::default(),
            CellUpdate::Symbol(symbol) => {
                cell.symbol = symbol;
                cell.highlighted = false;
            }
            CellUpdate::Interactable(interactable) => cell.interactable = interactable,
            CellUpdate::Winning => cell.winning = true,
            CellUpdate::Highlight => cell.highlighted = true,
        }
    }

    /// Handles a game event from the controller.
    pub fn handle_event(&mut self, event: GameEvent, now: Instant) {
        debug!(?event, "Handling game event");

        match event {
            GameEvent::PlayersAssigned { first, second } => {
                self.panels = [first, second]
                    .into_iter()
                    .map(|player| PlayerPanel {
                        player,
                        fraction: 0.0,
                        on_turn: false,
                    })
                    .collect();
                self.banner = None;
                self.pending_banner = None;
            }
            GameEvent::TurnChanged { player } => {
                for panel in &mut self.panels {
                    panel.on_turn = panel.player == player;
                    panel.fraction = 0.0;
                }
                self.status_message = if player.is_automated() {
                    format!("{} is thinking...", player.name())
                } else {
                    format!("{}'s turn ({})", player.name(), player.symbol())
                };
            }
            GameEvent::TimerProgress { player, fraction } => {
                if let Some(panel) = self.panels.iter_mut().find(|p| p.player == player) {
                    panel.fraction = fraction;
                }
            }
            GameEvent::MovePlayed { player, position } => {
                debug!(%player, %position, "Move shown");
                for cell in &mut self.cells {
                    cell.highlighted = false;
                }
            }
            GameEvent::MoveUndone { position } => {
                self.status_message = format!("Move at {position} taken back");
            }
            GameEvent::Hint { position } => {
                self.status_message = format!("Try {position}");
            }
            GameEvent::Sound(cue) => {
                debug!(%cue, "Audio cue");
                self.bell = true;
            }
            GameEvent::GameOver {
                winner, by_timeout, ..
            } => {
                for panel in &mut self.panels {
                    panel.on_turn = false;
                }
                let text = match &winner {
                    Some(player) => format!("{} WON!", player.name()),
                    None => "Draw".to_string(),
                };
                self.status_message = match &winner {
                    Some(_) if by_timeout => "Time is up. Press 'n' or 'c' for a new game.",
                    _ => "Game over. Press 'n' or 'c' for a new game.",
                }
                .to_string();
                if winner.is_some() && !by_timeout {
                    self.pending_banner = Some((now + BANNER_DELAY, text));
                } else {
                    self.banner = Some(text);
                }
            }
        }
    }

    /// Shows a pending banner once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if self
            .pending_banner
            .as_ref()
            .is_some_and(|(due, _)| now >= *due)
        {
            self.banner = self.pending_banner.take().map(|(_, text)| text);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
