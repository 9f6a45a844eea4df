//! Clock abstraction for timestamping and filename rotation.
//!
//! On an embedded target the wall clock starts unset and only becomes
//! available once time has been synchronized over the network. The
//! [`Clock`] trait models that: wall time is optional, while a monotonic
//! millisecond counter since boot is always present.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::time::Instant;

/// Time source for the logger and the admission coordinator.
pub trait Clock: Send + Sync {
    /// Returns the current local wall-clock time, or `None` when the clock
    /// has not been synchronized yet.
    fn wall_time(&self) -> Option<DateTime<Local>>;

    /// Milliseconds elapsed since the process (or device) started.
    fn millis_since_boot(&self) -> u64;
}

/// Production clock: wall time from the OS, boot time from process start.
#[derive(Debug)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn wall_time(&self) -> Option<DateTime<Local>> {
        Some(Local::now())
    }

    fn millis_since_boot(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// A clock with externally controlled readings.
///
/// Tests use this to pin a wall-clock date or to model the
/// not-yet-synchronized state (`wall_time()` returning `None`).
#[derive(Debug, Default)]
pub struct ManualClock {
    wall: Mutex<Option<DateTime<Local>>>,
    millis: Mutex<u64>,
}

impl ManualClock {
    /// Create a clock with no wall time and zero elapsed millis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wall-clock reading.
    pub fn set_wall_time(&self, time: Option<DateTime<Local>>) {
        *self.wall.lock() = time;
    }

    /// Set the millis-since-boot reading.
    pub fn set_millis(&self, millis: u64) {
        *self.millis.lock() = millis;
    }
}

impl Clock for ManualClock {
    fn wall_time(&self) -> Option<DateTime<Local>> {
        *self.wall.lock()
    }

    fn millis_since_boot(&self) -> u64 {
        *self.millis.lock()
    }
}
