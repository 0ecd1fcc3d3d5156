//! Persisted user settings: audio and turn timer.

use crate::error::{SettingsError, SettingsErrorKind};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Accepted turn durations, in seconds.
///
/// The shortest turns are shorter than the computer's thinking pause
/// ([`crate::AUTO_MOVE_MAX_DELAY`]), so at 1 or 2 seconds the computer
/// often loses on time.
pub const TURN_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// Read-only view of the settings consulted at session start.
pub trait SettingsStore: Send + Sync {
    /// Whether audio cues should be emitted.
    fn audio_enabled(&self) -> bool;

    /// Time each player has per turn, or `None` for untimed play.
    fn turn_duration(&self) -> Option<Duration>;
}

/// Game settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Settings {
    /// Emit audio cues.
    #[getter(skip)]
    #[serde(default = "default_audio_enabled")]
    audio_enabled: bool,

    /// Limit the time each player has per turn.
    #[serde(default = "default_timer_enabled")]
    timer_enabled: bool,

    /// Seconds per turn when the timer is enabled.
    #[serde(default = "default_timer_seconds")]
    timer_seconds: u32,
}

fn default_audio_enabled() -> bool {
    true
}

fn default_timer_enabled() -> bool {
    true
}

fn default_timer_seconds() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: default_audio_enabled(),
            timer_enabled: default_timer_enabled(),
            timer_seconds: default_timer_seconds(),
        }
    }
}

impl Settings {
    /// Creates settings, validating the turn duration.
    #[track_caller]
    pub fn new(
        audio_enabled: bool,
        timer_enabled: bool,
        timer_seconds: u32,
    ) -> Result<Self, SettingsError> {
        validate_seconds(timer_seconds)?;
        Ok(Self {
            audio_enabled,
            timer_enabled,
            timer_seconds,
        })
    }

    /// Settings with the turn timer switched off.
    pub fn untimed() -> Self {
        Self {
            timer_enabled: false,
            ..Self::default()
        }
    }

    /// Turns audio cues on or off.
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }

    /// Turns the turn timer on or off.
    pub fn set_timer_enabled(&mut self, enabled: bool) {
        self.timer_enabled = enabled;
    }

    /// Sets the turn duration.
    #[track_caller]
    pub fn set_timer_seconds(&mut self, seconds: u32) -> Result<(), SettingsError> {
        validate_seconds(seconds)?;
        self.timer_seconds = seconds;
        Ok(())
    }

    /// Moves the turn duration by `delta` seconds, clamped to
    /// [`TURN_SECONDS_RANGE`]. Returns the new value.
    pub fn step_timer_seconds(&mut self, delta: i32) -> u32 {
        let (min, max) = (*TURN_SECONDS_RANGE.start(), *TURN_SECONDS_RANGE.end());
        let stepped = i64::from(self.timer_seconds) + i64::from(delta);
        self.timer_seconds = u32::try_from(stepped.clamp(i64::from(min), i64::from(max)))
            .unwrap_or(min);
        self.timer_seconds
    }

    /// Parses settings from TOML. Missing keys take their defaults.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SettingsError::new(SettingsErrorKind::Parse(e.to_string())))?;
        validate_seconds(settings.timer_seconds)?;
        Ok(settings)
    }

    /// Renders settings as TOML.
    #[instrument(skip(self))]
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self)
            .map_err(|e| SettingsError::new(SettingsErrorKind::Serialize(e.to_string())))
    }
}

impl SettingsStore for Settings {
    fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    fn turn_duration(&self) -> Option<Duration> {
        self.timer_enabled
            .then(|| Duration::from_secs(u64::from(self.timer_seconds)))
    }
}

#[track_caller]
fn validate_seconds(seconds: u32) -> Result<(), SettingsError> {
    if TURN_SECONDS_RANGE.contains(&seconds) {
        Ok(())
    } else {
        Err(SettingsError::new(SettingsErrorKind::InvalidDuration(seconds)))
    }
}

/// Settings persisted as a TOML file.
#[derive(Debug, Clone, Getters)]
pub struct FileSettings {
    /// Location of the TOML file.
    path: PathBuf,
    /// Current values.
    settings: Settings,
}

impl FileSettings {
    /// Loads settings from an existing file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SettingsError::new(SettingsErrorKind::Read(e.to_string())))?;
        let settings = Settings::from_toml(&content)?;
        info!(?settings, "Settings loaded");
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            settings,
        })
    }

    /// Loads settings, falling back to defaults when the file does not exist.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        info!("No settings file, using defaults");
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            settings: Settings::default(),
        })
    }

    /// Mutable access for editing before [`FileSettings::save`].
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Writes the current values back to the file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<(), SettingsError> {
        let content = self.settings.to_toml()?;
        std::fs::write(&self.path, content)
            .map_err(|e| SettingsError::new(SettingsErrorKind::Write(e.to_string())))?;
        info!("Settings saved");
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn audio_enabled(&self) -> bool {
        self.settings.audio_enabled
    }

    fn turn_duration(&self) -> Option<Duration> {
        self.settings.turn_duration()
    }
}

/// Settings shared with an editor. The controller reads the latest values
/// at every restart.
impl<S: SettingsStore> SettingsStore for RwLock<S> {
    fn audio_enabled(&self) -> bool {
        match self.read() {
            Ok(store) => store.audio_enabled(),
            Err(poisoned) => poisoned.into_inner().audio_enabled(),
        }
    }

    fn turn_duration(&self) -> Option<Duration> {
        match self.read() {
            Ok(store) => store.turn_duration(),
            Err(poisoned) => poisoned.into_inner().turn_duration(),
        }
    }
}
