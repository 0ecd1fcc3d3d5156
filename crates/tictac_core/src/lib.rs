//! Tictac core - tic-tac-toe game logic
//!
//! Board state, win detection, undo history, the per-turn countdown and the
//! orchestration that ties them to view collaborators.
//!
//! # Architecture
//!
//! - **Board**: 3x3 grid, win/draw detection, undo stack
//! - **Timer**: restartable countdown with progress and expiry callbacks
//! - **Players**: symbol assignment by coin flip and turn tracking
//! - **Controller**: single-task state machine fed by clicks, controls,
//!   timer events and delayed computer moves
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictac_core::{
//!     ClickSender, GameController, PlayerKind, Position, Settings, Symbol, SymbolView,
//!     ViewFactory,
//! };
//! use tokio::sync::mpsc;
//!
//! struct Cell(Option<Position>);
//!
//! impl SymbolView for Cell {
//!     fn position(&self) -> Position { self.0.expect("bound at construction") }
//!     fn set_position(&mut self, position: Position) { self.0 = Some(position); }
//!     fn reset(&mut self) {}
//!     fn draw_symbol(&mut self, _symbol: Option<Symbol>) {}
//!     fn set_interactable(&mut self, _interactable: bool) {}
//!     fn play_winning_animation(&mut self) {}
//!     fn highlight(&mut self) {}
//! }
//!
//! struct Cells;
//!
//! impl ViewFactory for Cells {
//!     type View = Cell;
//!     fn create(&mut self, _clicks: ClickSender) -> Cell { Cell(None) }
//! }
//!
//! # async fn example() {
//! let (event_tx, _event_rx) = mpsc::unbounded_channel();
//! let (controller, handle) = GameController::new(&mut Cells, Arc::new(Settings::default()), event_tx);
//! tokio::spawn(controller.run());
//! handle.restart(PlayerKind::Computer).unwrap();
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod controller;
mod error;
mod events;
mod players;
mod settings;
mod timer;
mod types;
mod view;

pub use board::{Board, Line};
pub use controller::{AUTO_MOVE_MAX_DELAY, AUTO_MOVE_MIN_DELAY, GameController, GameHandle, Phase};
pub use error::{BoardError, SessionError, SettingsError, SettingsErrorKind};
pub use events::{AudioCue, GameEvent};
pub use players::{FIRST_PLAYER_NAME, Player, PlayerKind, Players, SECOND_PLAYER_NAME};
pub use settings::{FileSettings, Settings, SettingsStore, TURN_SECONDS_RANGE};
pub use timer::{ExpireCallback, TICK_INTERVAL, TickCallback, Timer};
pub use types::{BOARD_SIZE, Position, SQUARE_COUNT, Symbol};
pub use view::{ClickSender, SymbolView, ViewFactory};
