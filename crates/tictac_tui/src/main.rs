//! Tictac - terminal tic-tac-toe

mod app;
mod cli;
mod input;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tictac_core::{
    ClickSender, FileSettings, GameController, GameEvent, GameHandle, PlayerKind, Settings,
    SettingsStore,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::EnvFilter;

use app::App;
use cli::{Cli, Command, SettingsAction};
use input::Action;
use view::{TerminalCells, ViewMessage};

/// Redraw cadence, also the resolution of the banner delay.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// How long the input thread blocks before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    match cli.command {
        Some(Command::Settings { action }) => run_settings(&cli.settings, action),
        None => run_tui(&cli.settings, cli.opponent).await,
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Prints or edits the settings file.
#[instrument]
fn run_settings(path: &Path, action: SettingsAction) -> Result<()> {
    let mut file = FileSettings::load_or_default(path)?;
    match action {
        SettingsAction::Show => {
            println!("# {}", path.display());
            print!("{}", file.settings().to_toml()?);
        }
        SettingsAction::Set {
            audio,
            timer,
            seconds,
        } => {
            let settings = file.settings_mut();
            if let Some(audio) = audio {
                settings.set_audio_enabled(audio.into());
            }
            if let Some(timer) = timer {
                settings.set_timer_enabled(timer.into());
            }
            if let Some(seconds) = seconds {
                settings.set_timer_seconds(seconds)?;
            }
            file.save()?;
            info!(path = %path.display(), "Settings saved");
            print!("{}", file.settings().to_toml()?);
        }
    }
    Ok(())
}

/// Runs the interactive game until the player quits.
async fn run_tui(settings_path: &Path, opponent: PlayerKind) -> Result<()> {
    let settings = Arc::new(RwLock::new(FileSettings::load_or_default(settings_path)?));
    let store: Arc<dyn SettingsStore> = settings.clone();
    info!(%opponent, "Starting tictac TUI");

    let (view_tx, mut view_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut cells = TerminalCells::new(view_tx);
    let (controller, handle) = GameController::new(&mut cells, store, event_tx);
    let controls = Controls {
        handle,
        clicks: cells.into_clicks(),
        settings,
    };
    let controller_task = tokio::spawn(controller.run());
    controls.handle.restart(opponent)?;

    let key_rx = spawn_input_thread();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(
        &mut terminal,
        App::new(),
        &controls,
        key_rx,
        &mut event_rx,
        &mut view_rx,
    )
    .await;

    if controls.handle.shutdown().is_ok() {
        let _ = controller_task.await;
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "UI loop failed");
    }
    res
}

/// Reads key presses on a plain thread so the runtime never blocks on the terminal.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<KeyCode> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(key.code).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) if tx.is_closed() => break,
                Ok(false) => {}
                Err(e) => {
                    error!(error = %e, "Failed to poll terminal events");
                    break;
                }
            }
        }
        debug!("Input thread stopped");
    });
    rx
}

/// Everything the input loop can send to the controller.
struct Controls {
    handle: GameHandle,
    /// Row-major, one per cell.
    clicks: Vec<ClickSender>,
    /// Also read by the controller at every restart.
    settings: Arc<RwLock<FileSettings>>,
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    controls: &Controls,
    mut key_rx: mpsc::UnboundedReceiver<KeyCode>,
    event_rx: &mut mpsc::UnboundedReceiver<GameEvent>,
    view_rx: &mut mpsc::UnboundedReceiver<ViewMessage>,
) -> Result<()> {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            Some(code) = key_rx.recv() => {
                if let Some(action) = input::action_for(code, app.settings_open()) {
                    if action == Action::Quit {
                        info!("Quit requested");
                        return Ok(());
                    }
                    dispatch(&mut app, controls, action)?;
                }
            }
            Some(event) = event_rx.recv() => app.handle_event(event, Instant::now()),
            Some(message) = view_rx.recv() => app.apply_view(message),
            _ = frames.tick() => app.tick(Instant::now()),
        }

        if app.take_bell() {
            execute!(io::stdout(), Print('\u{7}'))?;
        }
    }
}

fn dispatch(app: &mut App, controls: &Controls, action: Action) -> Result<()> {
    match action {
        Action::Cursor(direction) => app.move_cursor(direction),
        Action::PlaceAtCursor => click(app, controls)?,
        Action::PlaceAt(position) => {
            app.set_cursor(position);
            click(app, controls)?;
        }
        Action::Undo => controls.handle.undo()?,
        Action::Hint => controls.handle.hint()?,
        Action::NewGame(opponent) => controls.handle.restart(opponent)?,
        Action::OpenSettings => {
            let current = controls
                .settings
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .settings()
                .clone();
            app.open_settings(current);
        }
        Action::ToggleAudio => app.edit_settings(|s| {
            let enabled = !SettingsStore::audio_enabled(s);
            s.set_audio_enabled(enabled);
        }),
        Action::ToggleTimer => app.edit_settings(|s| {
            let enabled = !*s.timer_enabled();
            s.set_timer_enabled(enabled);
        }),
        Action::StepSeconds(delta) => app.edit_settings(|s| {
            s.step_timer_seconds(delta);
        }),
        Action::CloseSettings => {
            if let Some(edited) = app.close_settings() {
                save_settings(app, controls, edited);
            }
        }
        Action::Quit => {}
    }
    Ok(())
}

/// Stores edited settings for the next restart and writes them to disk.
#[instrument(skip(app, controls))]
fn save_settings(app: &mut App, controls: &Controls, edited: Settings) {
    let mut store = controls
        .settings
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *store.settings_mut() = edited;
    if let Err(e) = store.save() {
        error!(error = %e, "Failed to save settings");
        app.set_status(format!("Settings apply from the next game but were not saved: {}", e.kind));
    }
}

/// Clicks the cell under the cursor if it accepts input.
fn click(app: &App, controls: &Controls) -> Result<()> {
    let position = app.cursor();
    if !app.cell(position).interactable {
        debug!(%position, "Cell not interactable");
        return Ok(());
    }
    if let Some(clicks) = controls.clicks.get(position.index()) {
        clicks.click(position)?;
    }
    Ok(())
}
