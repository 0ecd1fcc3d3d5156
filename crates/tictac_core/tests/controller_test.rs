//! Tests for game orchestration, run on tokio's paused clock.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tictac_core::{
    AudioCue, ClickSender, GameController, GameEvent, GameHandle, Phase, PlayerKind, Position,
    SessionError, Settings, SettingsStore, Symbol, SymbolView, ViewFactory,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
enum ViewCall {
    Reset,
    Draw(Option<Symbol>),
    Interactable(bool),
    Winning,
    Highlight,
}

#[derive(Debug, Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<HashMap<Position, Vec<ViewCall>>>>,
    clicks: Arc<Mutex<Vec<ClickSender>>>,
}

impl Recorder {
    fn calls(&self, position: Position) -> Vec<ViewCall> {
        self.calls
            .lock()
            .unwrap()
            .get(&position)
            .cloned()
            .unwrap_or_default()
    }

    fn last_interactable(&self, position: Position) -> Option<bool> {
        self.calls(position).into_iter().rev().find_map(|call| match call {
            ViewCall::Interactable(flag) => Some(flag),
            _ => None,
        })
    }
}

struct RecordingView {
    position: Option<Position>,
    recorder: Recorder,
}

impl RecordingView {
    fn record(&self, call: ViewCall) {
        let position = self.position.expect("view bound to a cell");
        self.recorder
            .calls
            .lock()
            .unwrap()
            .entry(position)
            .or_default()
            .push(call);
    }
}

impl SymbolView for RecordingView {
    fn position(&self) -> Position {
        self.position.expect("view bound to a cell")
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    fn reset(&mut self) {
        self.record(ViewCall::Reset);
    }

    fn draw_symbol(&mut self, symbol: Option<Symbol>) {
        self.record(ViewCall::Draw(symbol));
    }

    fn set_interactable(&mut self, interactable: bool) {
        self.record(ViewCall::Interactable(interactable));
    }

    fn play_winning_animation(&mut self) {
        self.record(ViewCall::Winning);
    }

    fn highlight(&mut self) {
        self.record(ViewCall::Highlight);
    }
}

impl ViewFactory for Recorder {
    type View = RecordingView;

    fn create(&mut self, clicks: ClickSender) -> RecordingView {
        self.clicks.lock().unwrap().push(clicks);
        RecordingView {
            position: None,
            recorder: self.clone(),
        }
    }
}

type Controller = GameController<RecordingView, ChaCha8Rng>;

struct Fixture {
    controller: Controller,
    handle: GameHandle,
    events: mpsc::UnboundedReceiver<GameEvent>,
    recorder: Recorder,
}

fn fixture(settings: Settings, seed: u64) -> Fixture {
    fixture_with_store(Arc::new(settings), seed)
}

fn fixture_with_store(settings: Arc<dyn SettingsStore>, seed: u64) -> Fixture {
    let mut recorder = Recorder::default();
    let (event_tx, events) = mpsc::unbounded_channel();
    let (controller, handle) = GameController::with_rng(
        &mut recorder,
        settings,
        event_tx,
        ChaCha8Rng::seed_from_u64(seed),
    );
    Fixture {
        controller,
        handle,
        events,
        recorder,
    }
}

/// Starts a game whose opening player has the wanted kind.
fn started(settings: Settings, opponent: PlayerKind, opener: PlayerKind) -> Fixture {
    for seed in 0..256 {
        let mut f = fixture(settings.clone(), seed);
        f.controller.restart(opponent);
        let players = f.controller.players().expect("players after restart");
        if *players.current().kind() == opener {
            return f;
        }
    }
    panic!("no seed opens with {opener}");
}

fn drain(events: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn game_over(events: &[GameEvent]) -> Option<&GameEvent> {
    events
        .iter()
        .find(|e| matches!(e, GameEvent::GameOver { .. }))
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col).expect("on board")
}

fn current_symbol(controller: &Controller) -> Symbol {
    *controller.players().unwrap().current().symbol()
}

#[tokio::test(start_paused = true)]
async fn test_row_win_ends_game() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    let opener = f.controller.players().unwrap().current().clone();
    assert_eq!(*opener.symbol(), Symbol::X);
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);

    for position in [pos(0, 0), pos(1, 0), pos(0, 1), pos(1, 1), pos(0, 2)] {
        f.controller.place(position);
    }

    assert_eq!(f.controller.phase(), Phase::GameOver);
    let events = drain(&mut f.events);
    let line = [pos(0, 0), pos(0, 1), pos(0, 2)];
    assert_eq!(
        game_over(&events),
        Some(&GameEvent::GameOver {
            winner: Some(opener),
            by_timeout: false,
            winning_line: Some(line),
        })
    );
    for cell in line {
        assert!(f.recorder.calls(cell).contains(&ViewCall::Winning));
    }
    assert!(!f.recorder.calls(pos(1, 0)).contains(&ViewCall::Winning));
    assert_eq!(f.recorder.last_interactable(pos(2, 2)), Some(false));

    f.controller.place(pos(2, 2));
    assert!(!f.controller.board().is_occupied(pos(2, 2)));
}

#[tokio::test(start_paused = true)]
async fn test_full_board_without_line_is_draw() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    let moves = [
        pos(0, 0),
        pos(0, 1),
        pos(0, 2),
        pos(1, 1),
        pos(1, 0),
        pos(1, 2),
        pos(2, 1),
        pos(2, 0),
        pos(2, 2),
    ];
    for position in moves {
        f.controller.place(position);
    }

    assert_eq!(f.controller.phase(), Phase::GameOver);
    let events = drain(&mut f.events);
    assert_eq!(
        game_over(&events),
        Some(&GameEvent::GameOver {
            winner: None,
            by_timeout: false,
            winning_line: None,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_occupied_click_ignored() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    f.controller.place(pos(1, 1));
    let second = current_symbol(&f.controller);

    f.controller.place(pos(1, 1));

    assert_eq!(f.controller.board().history().len(), 1);
    assert_eq!(f.controller.board().symbol_at(pos(1, 1)), Some(Symbol::X));
    assert_eq!(current_symbol(&f.controller), second);
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);
}

#[tokio::test(start_paused = true)]
async fn test_undo_returns_turn_to_mover() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    f.controller.place(pos(0, 0));
    f.controller.place(pos(2, 2));
    assert_eq!(current_symbol(&f.controller), Symbol::X);

    f.controller.undo();

    assert!(!f.controller.board().is_occupied(pos(2, 2)));
    assert!(f.controller.board().is_occupied(pos(0, 0)));
    assert_eq!(current_symbol(&f.controller), Symbol::O);
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);
    let cleared = f
        .recorder
        .calls(pos(2, 2))
        .into_iter()
        .filter(|call| !matches!(call, ViewCall::Interactable(_)))
        .last();
    assert_eq!(cleared, Some(ViewCall::Reset));
    let events = drain(&mut f.events);
    assert!(events.contains(&GameEvent::MoveUndone {
        position: pos(2, 2)
    }));

    f.controller.undo();
    assert_eq!(current_symbol(&f.controller), Symbol::X);
    f.controller.undo();
    assert_eq!(current_symbol(&f.controller), Symbol::X);
    assert!(f.controller.board().history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_undo_not_allowed_after_game_over() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    for position in [pos(0, 0), pos(1, 0), pos(1, 1), pos(2, 0), pos(2, 2)] {
        f.controller.place(position);
    }
    assert_eq!(f.controller.phase(), Phase::GameOver);

    f.controller.undo();

    assert_eq!(f.controller.board().history().len(), 5);
    assert_eq!(f.controller.phase(), Phase::GameOver);
}

#[tokio::test(start_paused = true)]
async fn test_hint_highlights_free_cell() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    f.controller.place(pos(1, 1));

    let hint = f.controller.hint().expect("free cells remain");

    assert!(!f.controller.board().is_occupied(hint));
    assert!(f.recorder.calls(hint).contains(&ViewCall::Highlight));
    assert!(drain(&mut f.events).contains(&GameEvent::Hint { position: hint }));
}

#[tokio::test(start_paused = true)]
async fn test_hint_after_game_over_returns_nothing() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    for position in [pos(0, 0), pos(1, 0), pos(0, 1), pos(1, 1), pos(0, 2)] {
        f.controller.place(position);
    }
    assert_eq!(f.controller.hint(), None);
}

#[tokio::test(start_paused = true)]
async fn test_computer_replies_after_delay() {
    let mut f = started(Settings::untimed(), PlayerKind::Computer, PlayerKind::Human);
    let start = Instant::now();
    f.controller.place(pos(1, 1));

    assert_eq!(f.controller.phase(), Phase::AutomatedMoveDelay);
    assert_eq!(f.recorder.last_interactable(pos(0, 0)), Some(false));
    f.controller.place(pos(0, 0));
    assert_eq!(f.controller.board().history().len(), 1);

    assert!(f.controller.step().await);

    let waited = start.elapsed();
    assert!(waited >= Duration::from_millis(1000), "waited {waited:?}");
    assert!(waited < Duration::from_millis(2000), "waited {waited:?}");
    assert_eq!(f.controller.board().history().len(), 2);
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);
    assert_eq!(f.recorder.last_interactable(pos(0, 0)), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_computer_opens_when_holding_x() {
    let mut f = started(Settings::untimed(), PlayerKind::Computer, PlayerKind::Computer);
    assert_eq!(f.controller.phase(), Phase::AutomatedMoveDelay);

    assert!(f.controller.step().await);

    assert_eq!(f.controller.board().history().len(), 1);
    let played = f.controller.board().history()[0];
    assert_eq!(f.controller.board().symbol_at(played), Some(Symbol::X));
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);
}

#[tokio::test(start_paused = true)]
async fn test_undo_during_computer_delay_cancels_move() {
    let mut f = started(Settings::untimed(), PlayerKind::Computer, PlayerKind::Human);
    f.controller.place(pos(0, 0));
    assert_eq!(f.controller.phase(), Phase::AutomatedMoveDelay);

    f.controller.undo();
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);

    // The pending computer move is stale once it arrives.
    assert!(f.controller.step().await);

    assert!(f.controller.board().history().is_empty());
    assert_eq!(f.controller.phase(), Phase::AwaitingMove);
    assert_eq!(f.recorder.last_interactable(pos(1, 1)), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_awards_other_player() {
    let settings = Settings::new(false, true, 1).unwrap();
    let mut f = started(settings, PlayerKind::Human, PlayerKind::Human);
    let idle = f.controller.players().unwrap().current().clone();
    let other = f.controller.players().unwrap().previous().clone();
    assert!(f.controller.timer_running());

    let mut steps = 0;
    while f.controller.phase() != Phase::GameOver {
        assert!(f.controller.step().await);
        steps += 1;
        assert!(steps < 100, "timer never expired");
    }

    let events = drain(&mut f.events);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::TimerProgress { player, .. } if *player == idle
    )));
    assert_eq!(
        game_over(&events),
        Some(&GameEvent::GameOver {
            winner: Some(other),
            by_timeout: true,
            winning_line: None,
        })
    );
    assert!(!f.controller.timer_running());
}

#[tokio::test(start_paused = true)]
async fn test_move_restarts_turn_timer() {
    let settings = Settings::new(false, true, 1).unwrap();
    let mut f = started(settings, PlayerKind::Human, PlayerKind::Human);
    let opener = f.controller.players().unwrap().current().clone();
    let start = Instant::now();

    while start.elapsed() < Duration::from_millis(800) {
        assert!(f.controller.step().await);
    }
    f.controller.place(pos(1, 1));
    let moved_at = start.elapsed();

    while f.controller.phase() != Phase::GameOver {
        assert!(f.controller.step().await);
    }

    assert!(start.elapsed() >= moved_at + Duration::from_secs(1));
    let events = drain(&mut f.events);
    match game_over(&events) {
        Some(GameEvent::GameOver {
            winner, by_timeout, ..
        }) => {
            assert_eq!(winner.as_ref(), Some(&opener));
            assert!(*by_timeout);
        }
        other => panic!("expected game over, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_undo_restarts_turn_timer() {
    let settings = Settings::new(false, true, 1).unwrap();
    let mut f = started(settings, PlayerKind::Human, PlayerKind::Human);
    let opener = f.controller.players().unwrap().current().clone();
    let other = f.controller.players().unwrap().previous().clone();
    let start = Instant::now();

    f.controller.place(pos(0, 0));
    while start.elapsed() < Duration::from_millis(800) {
        assert!(f.controller.step().await);
    }
    f.controller.undo();
    let undone_at = start.elapsed();
    assert_eq!(*f.controller.players().unwrap().current(), opener);

    while f.controller.phase() != Phase::GameOver {
        assert!(f.controller.step().await);
    }

    assert!(start.elapsed() >= undone_at + Duration::from_secs(1));
    let events = drain(&mut f.events);
    assert_eq!(
        game_over(&events),
        Some(&GameEvent::GameOver {
            winner: Some(other),
            by_timeout: true,
            winning_line: None,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_while_computer_thinks_awards_human() {
    let settings = Settings::new(false, true, 1).unwrap();
    let mut f = started(settings, PlayerKind::Computer, PlayerKind::Human);
    let human = f.controller.players().unwrap().current().clone();

    f.controller.place(pos(1, 1));
    assert_eq!(f.controller.phase(), Phase::AutomatedMoveDelay);

    // The turn timer (1s) always runs out before the computer's pause ends.
    while f.controller.phase() != Phase::GameOver {
        assert!(f.controller.step().await);
        assert_eq!(f.controller.board().history().len(), 1);
    }

    let events = drain(&mut f.events);
    assert_eq!(
        game_over(&events),
        Some(&GameEvent::GameOver {
            winner: Some(human),
            by_timeout: true,
            winning_line: None,
        })
    );

    // The late computer move is dropped.
    assert!(f.controller.step().await);
    assert_eq!(f.controller.board().history().len(), 1);
    assert_eq!(f.controller.phase(), Phase::GameOver);
}

#[tokio::test(start_paused = true)]
async fn test_restart_applies_edited_settings() {
    let store = Arc::new(RwLock::new(Settings::default()));
    let mut f = fixture_with_store(store.clone(), 7);

    f.controller.restart(PlayerKind::Human);
    assert!(f.controller.timer_running());
    assert!(drain(&mut f.events).contains(&GameEvent::Sound(AudioCue::ButtonClick)));

    {
        let mut settings = store.write().unwrap();
        settings.set_audio_enabled(false);
        settings.set_timer_enabled(false);
    }
    // Edits only take effect on the next restart.
    f.controller.place(pos(0, 0));
    assert!(f.controller.timer_running());
    assert!(drain(&mut f.events).contains(&GameEvent::Sound(AudioCue::Symbol)));

    f.controller.restart(PlayerKind::Human);
    f.controller.place(pos(1, 1));
    assert!(!f.controller.timer_running());
    assert!(
        !drain(&mut f.events)
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(_)))
    );

    store.write().unwrap().set_timer_enabled(true);
    f.controller.restart(PlayerKind::Human);
    assert!(f.controller.timer_running());
}

#[tokio::test(start_paused = true)]
async fn test_untimed_settings_skip_timer() {
    let f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    assert!(!f.controller.timer_running());
}

#[tokio::test(start_paused = true)]
async fn test_audio_cues_follow_settings() {
    let mut quiet = Settings::untimed();
    quiet.set_audio_enabled(false);
    let mut f = started(quiet, PlayerKind::Human, PlayerKind::Human);
    f.controller.place(pos(0, 0));
    assert!(
        !drain(&mut f.events)
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(_)))
    );

    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    drain(&mut f.events);
    f.controller.place(pos(0, 0));
    assert!(drain(&mut f.events).contains(&GameEvent::Sound(AudioCue::Symbol)));
}

#[tokio::test(start_paused = true)]
async fn test_restart_resets_board_and_views() {
    let mut f = started(Settings::untimed(), PlayerKind::Human, PlayerKind::Human);
    f.controller.place(pos(0, 0));
    f.controller.place(pos(1, 1));

    f.controller.restart(PlayerKind::Human);

    assert!(f.controller.board().history().is_empty());
    assert_eq!(f.controller.board().available_positions().len(), 9);
    assert_eq!(f.recorder.calls(pos(0, 0)).last(), Some(&ViewCall::Interactable(true)));
    assert!(f.recorder.calls(pos(0, 0)).contains(&ViewCall::Reset));
    assert_eq!(current_symbol(&f.controller), Symbol::X);
}

#[tokio::test(start_paused = true)]
async fn test_clicks_and_handle_drive_running_controller() {
    let Fixture {
        controller,
        handle,
        mut events,
        recorder,
    } = fixture(Settings::untimed(), 1);
    let task = tokio::spawn(controller.run());

    handle.restart(PlayerKind::Human).unwrap();
    let clicks = recorder.clicks.lock().unwrap()[0].clone();
    clicks.click(pos(2, 2)).unwrap();

    let played = loop {
        match events.recv().await.expect("controller alive") {
            GameEvent::MovePlayed { position, .. } => break position,
            _ => continue,
        }
    };
    assert_eq!(played, pos(2, 2));
    assert!(
        recorder
            .calls(pos(2, 2))
            .contains(&ViewCall::Draw(Some(Symbol::X)))
    );

    handle.shutdown().unwrap();
    task.await.unwrap();
    assert_eq!(handle.undo(), Err(SessionError::ControllerGone));
}
