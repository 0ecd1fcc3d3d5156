//! Command-line interface for tictac.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tictac_core::PlayerKind;

/// Tictac - tic-tac-toe in the terminal
#[derive(Parser, Debug)]
#[command(name = "tictac")]
#[command(about = "Tic-tac-toe against a friend or the computer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (created on first save)
    #[arg(long, env = "TICTAC_SETTINGS", default_value = "tictac.toml", global = true)]
    pub settings: PathBuf,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, default_value = "tictac.log", global = true)]
    pub log_file: PathBuf,

    /// Opponent of Player 1 in the first game
    #[arg(long, default_value = "computer")]
    pub opponent: PlayerKind,

    /// Subcommand to run; plays a game when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or edit the settings file
    Settings {
        /// Settings action
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Settings file actions
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the effective settings
    Show,

    /// Change one or more settings and save them
    Set {
        /// Audio cues
        #[arg(long)]
        audio: Option<Switch>,

        /// Turn timer
        #[arg(long)]
        timer: Option<Switch>,

        /// Seconds per turn (1-60)
        #[arg(long)]
        seconds: Option<u32>,
    },
}

/// On/off flag value.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// Enabled
    On,
    /// Disabled
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}
