//! Players and turn tracking.

use crate::types::Symbol;
use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Name of the always-human first slot.
pub const FIRST_PLAYER_NAME: &str = "Player 1";

/// Name of the configurable second slot.
pub const SECOND_PLAYER_NAME: &str = "Player 2";

/// Who controls a player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKind {
    /// Moves come from user input.
    Human,
    /// Moves are picked at random after a short delay.
    Computer,
}

/// Immutable participant record.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct Player {
    /// Display name.
    #[new(into)]
    name: String,
    /// Assigned symbol.
    symbol: Symbol,
    /// Human or computer controlled.
    kind: PlayerKind,
}

impl Player {
    /// True for computer-controlled players.
    pub fn is_automated(&self) -> bool {
        self.kind == PlayerKind::Computer
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.symbol, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    First,
    Second,
}

/// The two players of a session and whose turn it is.
#[derive(Debug, Clone)]
pub struct Players {
    first: Player,
    second: Player,
    turn: Slot,
}

impl Players {
    /// Assigns symbols by coin flip. The holder of X moves first.
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(opponent: PlayerKind, rng: &mut R) -> Self {
        let (first_symbol, second_symbol) = if rng.gen_bool(0.5) {
            (Symbol::O, Symbol::X)
        } else {
            (Symbol::X, Symbol::O)
        };
        let first = Player::new(FIRST_PLAYER_NAME, first_symbol, PlayerKind::Human);
        let second = Player::new(SECOND_PLAYER_NAME, second_symbol, opponent);
        let turn = if first_symbol == Symbol::X {
            Slot::First
        } else {
            Slot::Second
        };
        info!(%first, %second, "Players assigned");
        Self {
            first,
            second,
            turn,
        }
    }

    /// The always-human first slot.
    pub fn first(&self) -> &Player {
        &self.first
    }

    /// The configurable second slot.
    pub fn second(&self) -> &Player {
        &self.second
    }

    /// Player whose turn it is.
    pub fn current(&self) -> &Player {
        match self.turn {
            Slot::First => &self.first,
            Slot::Second => &self.second,
        }
    }

    /// The player not on turn.
    pub fn previous(&self) -> &Player {
        match self.turn {
            Slot::First => &self.second,
            Slot::Second => &self.first,
        }
    }

    /// Hands the turn to the other player.
    pub fn switch_turn(&mut self) {
        self.turn = match self.turn {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        };
    }
}
