//! Cell views that forward controller calls to the UI loop.

use tictac_core::{ClickSender, Position, Symbol, SymbolView, ViewFactory};
use tokio::sync::mpsc;
use tracing::warn;

/// A change requested for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellUpdate {
    Reset,
    Symbol(Option<Symbol>),
    Interactable(bool),
    Winning,
    Highlight,
}

/// A [`CellUpdate`] addressed to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewMessage {
    pub position: Position,
    pub update: CellUpdate,
}

/// Terminal cell. Owned by the controller; rendering happens in the UI loop.
#[derive(Debug)]
pub struct TerminalCell {
    position: Position,
    tx: mpsc::UnboundedSender<ViewMessage>,
}

impl TerminalCell {
    fn send(&self, update: CellUpdate) {
        let message = ViewMessage {
            position: self.position,
            update,
        };
        if self.tx.send(message).is_err() {
            warn!(position = %self.position, "UI loop gone, cell update dropped");
        }
    }
}

impl SymbolView for TerminalCell {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn reset(&mut self) {
        self.send(CellUpdate::Reset);
    }

    fn draw_symbol(&mut self, symbol: Option<Symbol>) {
        self.send(CellUpdate::Symbol(symbol));
    }

    fn set_interactable(&mut self, interactable: bool) {
        self.send(CellUpdate::Interactable(interactable));
    }

    fn play_winning_animation(&mut self) {
        self.send(CellUpdate::Winning);
    }

    fn highlight(&mut self) {
        self.send(CellUpdate::Highlight);
    }
}

/// Builds [`TerminalCell`]s and keeps their click senders for the input loop.
#[derive(Debug)]
pub struct TerminalCells {
    tx: mpsc::UnboundedSender<ViewMessage>,
    clicks: Vec<ClickSender>,
}

impl TerminalCells {
    pub fn new(tx: mpsc::UnboundedSender<ViewMessage>) -> Self {
        Self {
            tx,
            clicks: Vec::new(),
        }
    }

    /// Click senders in creation order, which is row-major.
    pub fn into_clicks(self) -> Vec<ClickSender> {
        self.clicks
    }
}

impl ViewFactory for TerminalCells {
    type View = TerminalCell;

    fn create(&mut self, clicks: ClickSender) -> TerminalCell {
        self.clicks.push(clicks);
        TerminalCell {
            position: Position::default(),
            tx: self.tx.clone(),
        }
    }
}
