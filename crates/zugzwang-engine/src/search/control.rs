//! Search control — stop flag and time management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Controls when a search should stop.
///
/// Checked periodically by the search (every 2048 nodes) to decide whether
/// to abort. Supports two modes:
/// - **Infinite**: no time pressure, only responds to the external stop flag
/// - **Timed**: clock starts immediately, bounded by a soft and hard limit
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    clock_active: bool,
    start: Mutex<Option<Instant>>,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
}

impl SearchControl {
    /// Create control for a search without time limits, stoppable only via
    /// the external stop flag.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            clock_active: false,
            start: Mutex::new(None),
            soft_limit: None,
            hard_limit: None,
        }
    }

    /// Create control with time limits; clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self {
            stopped,
            clock_active: true,
            start: Mutex::new(Some(Instant::now())),
            soft_limit: Some(soft),
            hard_limit: Some(hard),
        }
    }

    /// Check whether the search should abort immediately.
    ///
    /// Returns `true` if the external stop flag was set, or the clock is
    /// active and the hard limit has been exceeded. The clock is only
    /// checked every 2048 nodes.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if nodes & 2047 != 0 {
            return false;
        }

        if !self.clock_active {
            return false;
        }

        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }

        false
    }

    /// Check whether iterative deepening should start a new iteration.
    ///
    /// Called between ID iterations. Returns `true` once the soft limit has
    /// elapsed, meaning another full iteration is unlikely to finish in time.
    pub fn should_stop_iterating(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if !self.clock_active {
            return false;
        }

        if let Some(soft) = self.soft_limit {
            return self.elapsed() >= soft;
        }

        false
    }

    /// Elapsed time since the clock started. Returns [`Duration::ZERO`] for
    /// an infinite control.
    pub fn elapsed(&self) -> Duration {
        self.start
            .lock()
            .expect("start mutex poisoned")
            .map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}
