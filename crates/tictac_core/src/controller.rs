//! Game orchestration: board, players and turn timer driven by commands.
//!
//! A [`GameController`] owns every piece of game state and processes one
//! [`Command`] at a time from a single channel. Clicks, controls, timer
//! ticks and automated moves all arrive through that channel, so a move is
//! fully resolved before the next event is looked at. Run it on a
//! current-thread runtime.

use crate::board::Board;
use crate::error::SessionError;
use crate::events::{AudioCue, GameEvent};
use crate::players::{Player, PlayerKind, Players};
use crate::settings::SettingsStore;
use crate::timer::Timer;
use crate::types::Position;
use crate::view::{ClickSender, SymbolView, ViewFactory};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Shortest "thinking" pause before a computer move.
pub const AUTO_MOVE_MIN_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound (exclusive) of the computer "thinking" pause.
pub const AUTO_MOVE_MAX_DELAY: Duration = Duration::from_millis(2000);

/// Commands processed by the controller loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Place(Position),
    Undo,
    Hint,
    Restart(PlayerKind),
    Shutdown,
    TimerTick { generation: u64, progress: f32 },
    TimerExpired { generation: u64 },
    AutoMove { turn: u64 },
}

/// Where the game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Phase {
    /// No game has been started yet.
    NotStarted,
    /// Waiting for a human click.
    AwaitingMove,
    /// A move just landed and its outcome is being evaluated.
    Resolving,
    /// Waiting before the computer plays.
    AutomatedMoveDelay,
    /// The game ended. Only a restart leaves this phase.
    GameOver,
}

/// Cloneable handle for sending controls to a running controller.
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl GameHandle {
    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::ControllerGone)
    }

    /// Plays the current turn at `position`.
    pub fn place(&self, position: Position) -> Result<(), SessionError> {
        self.send(Command::Place(position))
    }

    /// Takes back the last move.
    pub fn undo(&self) -> Result<(), SessionError> {
        self.send(Command::Undo)
    }

    /// Highlights a random free cell.
    pub fn hint(&self) -> Result<(), SessionError> {
        self.send(Command::Hint)
    }

    /// Starts a new game against `opponent`.
    pub fn restart(&self, opponent: PlayerKind) -> Result<(), SessionError> {
        self.send(Command::Restart(opponent))
    }

    /// Stops the controller loop.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown)
    }
}

/// Owns the board, players and timer of the single game session.
pub struct GameController<V: SymbolView, R: Rng = StdRng> {
    board: Board,
    players: Option<Players>,
    phase: Phase,
    timer: Option<Timer>,
    /// Bumped whenever the timer is restarted or stopped.
    timer_generation: Arc<AtomicU64>,
    /// Bumped on every turn change, reset and game end.
    turn: u64,
    audio_enabled: bool,
    views: Vec<V>,
    settings: Arc<dyn SettingsStore>,
    events: mpsc::UnboundedSender<GameEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    command_tx: mpsc::UnboundedSender<Command>,
    rng: R,
}

impl<V: SymbolView> GameController<V, StdRng> {
    /// Creates a controller with an entropy-seeded RNG.
    pub fn new<F>(
        factory: &mut F,
        settings: Arc<dyn SettingsStore>,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> (Self, GameHandle)
    where
        F: ViewFactory<View = V>,
    {
        Self::with_rng(factory, settings, events, StdRng::from_entropy())
    }
}

impl<V: SymbolView, R: Rng> GameController<V, R> {
    /// Creates a controller drawing randomness from `rng`.
    ///
    /// One view per cell is requested from `factory`, each bound to its
    /// position and given a [`ClickSender`] into this controller.
    pub fn with_rng<F>(
        factory: &mut F,
        settings: Arc<dyn SettingsStore>,
        events: mpsc::UnboundedSender<GameEvent>,
        rng: R,
    ) -> (Self, GameHandle)
    where
        F: ViewFactory<View = V>,
    {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let views = Position::all()
            .map(|position| {
                let mut view = factory.create(ClickSender::new(command_tx.clone()));
                view.set_position(position);
                view.set_interactable(false);
                view
            })
            .collect();
        let handle = GameHandle {
            tx: command_tx.clone(),
        };
        let controller = Self {
            board: Board::new(),
            players: None,
            phase: Phase::NotStarted,
            timer: None,
            timer_generation: Arc::new(AtomicU64::new(0)),
            turn: 0,
            audio_enabled: false,
            views,
            settings,
            events,
            commands,
            command_tx,
            rng,
        };
        (controller, handle)
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players of the current game, once started.
    pub fn players(&self) -> Option<&Players> {
        self.players.as_ref()
    }

    /// True if a turn countdown is running.
    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(Timer::is_running)
    }

    /// Processes commands until [`GameHandle::shutdown`] is called.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Game controller running");
        while self.step().await {}
        self.stop_timer();
        info!("Game controller stopped");
    }

    /// Waits for the next command and handles it.
    ///
    /// Returns `false` once shutdown was requested.
    pub async fn step(&mut self) -> bool {
        // The controller keeps a sender, so the channel never closes.
        let Some(command) = self.commands.recv().await else {
            return false;
        };
        self.handle(command)
    }

    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Place(position) => self.place(position),
            Command::Undo => self.undo(),
            Command::Hint => {
                self.hint();
            }
            Command::Restart(opponent) => self.restart(opponent),
            Command::Shutdown => return false,
            Command::TimerTick {
                generation,
                progress,
            } => self.timer_tick(generation, progress),
            Command::TimerExpired { generation } => self.timer_expired(generation),
            Command::AutoMove { turn } => self.auto_move(turn),
        }
        true
    }

    /// Starts a new game: fresh players, empty board, timer per settings.
    #[instrument(skip(self))]
    pub fn restart(&mut self, opponent: PlayerKind) {
        let duration = self.settings.turn_duration();
        self.audio_enabled = self.settings.audio_enabled();
        let players = Players::new(opponent, &mut self.rng);

        self.board.reset();
        for view in &mut self.views {
            view.reset();
        }
        self.turn += 1;
        self.configure_timer(duration);
        self.sound(AudioCue::ButtonClick);
        self.emit(GameEvent::PlayersAssigned {
            first: players.first().clone(),
            second: players.second().clone(),
        });
        self.emit(GameEvent::TurnChanged {
            player: players.current().clone(),
        });
        self.players = Some(players);
        info!(?duration, "Game started");
        self.enter_turn();
    }

    /// Handles a click. Ignored unless a human is on turn and the cell is free.
    #[instrument(skip(self))]
    pub fn place(&mut self, position: Position) {
        if self.phase != Phase::AwaitingMove {
            debug!(phase = %self.phase, "Click ignored");
            return;
        }
        if self.board.is_occupied(position) {
            debug!(%position, "Click on occupied cell ignored");
            return;
        }
        self.resolve(position);
    }

    /// Takes back the last move and returns the turn to its author.
    #[instrument(skip(self))]
    pub fn undo(&mut self) {
        if !matches!(self.phase, Phase::AwaitingMove | Phase::AutomatedMoveDelay) {
            debug!(phase = %self.phase, "Undo ignored");
            return;
        }
        let Some(position) = self.board.remove_last() else {
            debug!("Nothing to undo");
            return;
        };
        if let Some(view) = self.view_mut(position) {
            view.reset();
        }
        self.sound(AudioCue::ButtonClick);
        self.emit(GameEvent::MoveUndone { position });
        self.restart_timer();
        self.switch_turn();
        self.enter_turn();
    }

    /// Highlights a random free cell. Returns `None` when the board is full
    /// or no game is in progress.
    #[instrument(skip(self))]
    pub fn hint(&mut self) -> Option<Position> {
        if !matches!(self.phase, Phase::AwaitingMove | Phase::AutomatedMoveDelay) {
            debug!(phase = %self.phase, "Hint ignored");
            return None;
        }
        let position = self.random_available_position()?;
        if let Some(view) = self.view_mut(position) {
            view.highlight();
        }
        self.sound(AudioCue::ButtonClick);
        self.emit(GameEvent::Hint { position });
        Some(position)
    }

    fn resolve(&mut self, position: Position) {
        let Some(player) = self.players.as_ref().map(|p| p.current().clone()) else {
            error!("Move resolved without players");
            return;
        };
        self.phase = Phase::Resolving;
        let symbol = *player.symbol();
        if let Err(e) = self.board.set_symbol(symbol, position) {
            error!(error = %e, "Move rejected by board");
            self.enter_turn();
            return;
        }
        if let Some(view) = self.view_mut(position) {
            view.draw_symbol(Some(symbol));
        }
        self.sound(AudioCue::Symbol);
        self.emit(GameEvent::MovePlayed {
            player: player.clone(),
            position,
        });
        debug!(board = %self.board, "Board after move");

        if self.board.check_win(symbol) {
            self.finish(Some(player), false);
            return;
        }
        if !self.board.has_available_positions() {
            self.finish(None, false);
            return;
        }
        self.restart_timer();
        self.switch_turn();
        self.enter_turn();
    }

    fn switch_turn(&mut self) {
        let Some(players) = self.players.as_mut() else {
            return;
        };
        players.switch_turn();
        let player = players.current().clone();
        self.turn += 1;
        debug!(%player, "Turn switched");
        self.emit(GameEvent::TurnChanged { player });
    }

    /// Sets phase and interactivity for the player on turn and schedules
    /// the computer's move when needed.
    fn enter_turn(&mut self) {
        let automated = self
            .players
            .as_ref()
            .is_some_and(|p| p.current().is_automated());
        if automated {
            self.phase = Phase::AutomatedMoveDelay;
            self.set_interactable(false);
            self.schedule_auto_move();
        } else {
            self.phase = Phase::AwaitingMove;
            self.set_interactable(true);
        }
    }

    fn schedule_auto_move(&mut self) {
        let delay = self.rng.gen_range(AUTO_MOVE_MIN_DELAY..AUTO_MOVE_MAX_DELAY);
        let turn = self.turn;
        let tx = self.command_tx.clone();
        debug!(?delay, turn, "Computer thinking");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::AutoMove { turn });
        });
    }

    fn auto_move(&mut self, turn: u64) {
        if turn != self.turn || self.phase != Phase::AutomatedMoveDelay {
            debug!(turn, current = self.turn, "Turn changed while computer was thinking");
            if self.phase == Phase::AwaitingMove {
                self.set_interactable(true);
            }
            return;
        }
        match self.random_available_position() {
            Some(position) => self.resolve(position),
            None => error!("No free cell for computer move"),
        }
    }

    fn finish(&mut self, winner: Option<Player>, by_timeout: bool) {
        self.phase = Phase::GameOver;
        self.turn += 1;
        self.set_interactable(false);
        self.stop_timer();

        let winning_line = if winner.is_some() && !by_timeout {
            self.board.winning_positions()
        } else {
            None
        };
        for position in winning_line.iter().flatten() {
            if let Some(view) = self.view_mut(*position) {
                view.play_winning_animation();
            }
        }
        if winner.is_some() {
            self.sound(AudioCue::GameOver);
        }
        match &winner {
            Some(player) => info!(%player, by_timeout, "Game won"),
            None => info!("Game drawn"),
        }
        self.emit(GameEvent::GameOver {
            winner,
            by_timeout,
            winning_line,
        });
    }

    fn configure_timer(&mut self, duration: Option<Duration>) {
        let Some(duration) = duration else {
            self.stop_timer();
            self.timer = None;
            return;
        };
        if self.timer.is_none() {
            self.timer = Some(self.build_timer(duration));
        }
        self.timer_generation.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = self.timer.as_mut() {
            timer.restart(Some(duration));
        }
    }

    fn build_timer(&self, duration: Duration) -> Timer {
        let tick_tx = self.command_tx.clone();
        let tick_generation = Arc::clone(&self.timer_generation);
        let expire_tx = self.command_tx.clone();
        let expire_generation = Arc::clone(&self.timer_generation);
        Timer::new(
            duration,
            move |progress| {
                let generation = tick_generation.load(Ordering::SeqCst);
                let _ = tick_tx.send(Command::TimerTick {
                    generation,
                    progress,
                });
            },
            move || {
                let generation = expire_generation.load(Ordering::SeqCst);
                let _ = expire_tx.send(Command::TimerExpired { generation });
            },
        )
    }

    fn restart_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            self.timer_generation.fetch_add(1, Ordering::SeqCst);
            timer.restart(None);
        }
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            self.timer_generation.fetch_add(1, Ordering::SeqCst);
            timer.stop();
        }
    }

    fn timer_is_current(&self, generation: u64) -> bool {
        generation == self.timer_generation.load(Ordering::SeqCst)
    }

    fn timer_tick(&mut self, generation: u64, fraction: f32) {
        if !self.timer_is_current(generation) {
            return;
        }
        if let Some(player) = self.players.as_ref().map(|p| p.current().clone()) {
            self.emit(GameEvent::TimerProgress { player, fraction });
        }
    }

    /// The player on turn ran out of time and the other player wins.
    fn timer_expired(&mut self, generation: u64) {
        if !self.timer_is_current(generation)
            || matches!(self.phase, Phase::NotStarted | Phase::GameOver)
        {
            debug!(generation, "Stale timer expiry ignored");
            return;
        }
        let Some(winner) = self.players.as_ref().map(|p| p.previous().clone()) else {
            return;
        };
        info!(%winner, "Turn timed out");
        self.finish(Some(winner), true);
    }

    fn random_available_position(&mut self) -> Option<Position> {
        let available = self.board.available_positions();
        let position = available.choose(&mut self.rng).copied();
        if position.is_none() {
            debug!("No free cell");
        }
        position
    }

    fn set_interactable(&mut self, interactable: bool) {
        for view in &mut self.views {
            view.set_interactable(interactable);
        }
    }

    fn view_mut(&mut self, position: Position) -> Option<&mut V> {
        let view = self.views.iter_mut().find(|v| v.position() == position);
        if view.is_none() {
            error!(%position, "No view bound to cell");
        }
        view
    }

    fn sound(&self, cue: AudioCue) {
        if self.audio_enabled {
            self.emit(GameEvent::Sound(cue));
        }
    }

    fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            warn!("Game event dropped, receiver closed");
        }
    }
}

impl<V: SymbolView, R: Rng> std::fmt::Debug for GameController<V, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("board", &self.board)
            .field("players", &self.players)
            .field("timer", &self.timer)
            .finish()
    }
}
