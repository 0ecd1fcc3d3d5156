//! Countdown timer with periodic progress reports.
//!
//! The countdown runs as a tokio task. Each tick reports the elapsed
//! fraction of the duration; reaching the duration fires the expiry
//! callback once. [`Timer::stop`] aborts the task, so a stopped timer
//! never expires.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

/// Interval between progress reports.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Called on every tick with elapsed/duration in `[0, 1]`.
pub type TickCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Called once when the countdown completes.
pub type ExpireCallback = Arc<dyn Fn() + Send + Sync>;

/// Restartable countdown.
///
/// Must be used from within a tokio runtime.
pub struct Timer {
    duration: Duration,
    on_tick: TickCallback,
    on_expire: ExpireCallback,
    task: Option<JoinHandle<()>>,
}

impl Timer {
    /// Creates an idle timer. Call [`Timer::restart`] to begin counting.
    pub fn new(
        duration: Duration,
        on_tick: impl Fn(f32) + Send + Sync + 'static,
        on_expire: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            duration,
            on_tick: Arc::new(on_tick),
            on_expire: Arc::new(on_expire),
            task: None,
        }
    }

    /// Configured countdown length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True while a countdown is in flight.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels any countdown and starts over from zero, optionally with a
    /// new duration.
    #[instrument(skip(self), fields(duration = ?self.duration))]
    pub fn restart(&mut self, new_duration: Option<Duration>) {
        self.stop();
        if let Some(duration) = new_duration {
            self.duration = duration;
        }
        self.start();
    }

    /// Cancels the countdown. The expiry callback will not fire.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            trace!("Timer stopped");
        }
    }

    fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let duration = self.duration;
        let on_tick = Arc::clone(&self.on_tick);
        let on_expire = Arc::clone(&self.on_expire);
        debug!(?duration, "Timer started");
        self.task = Some(tokio::spawn(async move {
            let mut elapsed = Duration::ZERO;
            while elapsed < duration {
                tokio::time::sleep(TICK_INTERVAL).await;
                elapsed += TICK_INTERVAL;
                let progress = (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0);
                on_tick(progress);
            }
            on_expire();
        }));
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("duration", &self.duration)
            .field("running", &self.is_running())
            .finish()
    }
}
