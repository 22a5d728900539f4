//! Elapsed-time tracking for a status history.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: Arc<Mutex<Instant>>,
}

impl FakeClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Stopwatch measuring how long a resource spent in progress.
pub struct StopWatch {
    start_time: Option<Instant>,
    stop_time: Option<Instant>,
    clock: Arc<dyn Clock>,
}

impl StopWatch {
    /// A stopwatch reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            start_time: None,
            stop_time: None,
            clock,
        }
    }

    /// Start the watch. Starting a started watch does nothing.
    pub fn start(&mut self) {
        if self.start_time.is_some() {
            return;
        }
        self.start_time = Some(self.clock.now());
    }

    /// Stop the watch. Does nothing unless started and still running.
    pub fn stop(&mut self) {
        if self.start_time.is_none() || self.stop_time.is_some() {
            return;
        }
        self.stop_time = Some(self.clock.now());
    }

    /// Forget any previous start and stop.
    pub fn reset(&mut self) {
        self.start_time = None;
        self.stop_time = None;
    }

    #[must_use]
    pub fn started(&self) -> bool {
        self.start_time.is_some()
    }

    #[must_use]
    pub fn stopped(&self) -> bool {
        self.stop_time.is_some()
    }

    /// Time between start and stop, or start and now while running.
    ///
    /// The flag is false, and the duration zero, if the watch never started.
    #[must_use]
    pub fn elapsed(&self) -> (Duration, bool) {
        let Some(start) = self.start_time else {
            return (Duration::ZERO, false);
        };
        let end = self.stop_time.unwrap_or_else(|| self.clock.now());
        (end.saturating_duration_since(start), true)
    }

    /// Start time, for inspection in tests.
    #[must_use]
    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }
}

impl Default for StopWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StopWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopWatch")
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .finish_non_exhaustive()
    }
}
