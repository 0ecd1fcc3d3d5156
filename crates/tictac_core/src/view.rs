//! Per-cell view collaborator and the click channel handed to it.

use crate::controller::Command;
use crate::error::SessionError;
use crate::types::{Position, Symbol};
use tokio::sync::mpsc;
use tracing::instrument;

/// Rendering side of a single board cell.
///
/// The controller drives every cell through this trait and never
/// renders anything itself.
pub trait SymbolView: Send {
    /// Cell this view represents.
    fn position(&self) -> Position;

    /// Binds the view to a cell.
    fn set_position(&mut self, position: Position);

    /// Clears the drawn symbol and any highlight or animation.
    fn reset(&mut self);

    /// Shows `symbol`, or nothing.
    fn draw_symbol(&mut self, symbol: Option<Symbol>);

    /// Allows or blocks clicks.
    fn set_interactable(&mut self, interactable: bool);

    /// Marks the cell as part of the winning line.
    fn play_winning_animation(&mut self);

    /// Marks the cell as a hint.
    fn highlight(&mut self);
}

/// Builds one view per cell when the controller is constructed.
pub trait ViewFactory {
    /// View type produced.
    type View: SymbolView;

    /// Creates a view that reports clicks through `clicks`.
    fn create(&mut self, clicks: ClickSender) -> Self::View;
}

/// Click callback registered with each cell view.
#[derive(Debug, Clone)]
pub struct ClickSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl ClickSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Reports a click on `position`.
    #[instrument(skip(self))]
    pub fn click(&self, position: Position) -> Result<(), SessionError> {
        self.tx
            .send(Command::Place(position))
            .map_err(|_| SessionError::ControllerGone)
    }
}
