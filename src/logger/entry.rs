//! Buffered log entries and line formatting.

use crate::clock::Clock;
use crate::logger::level::Level;
use chrono::{DateTime, Local};

/// Timestamp captured when a log entry is created.
///
/// Entries carry their own stamp so a batch written minutes later, or a
/// wall clock that synchronizes mid-run, never back-dates earlier lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stamp {
    /// Wall-clock time; available once the device clock is synchronized.
    Wall(DateTime<Local>),
    /// Milliseconds since boot; used before synchronization.
    Boot(u64),
}

impl Stamp {
    /// Capture a stamp from the given clock, preferring wall time.
    pub fn capture(clock: &dyn Clock) -> Self {
        match clock.wall_time() {
            Some(time) => Self::Wall(time),
            None => Self::Boot(clock.millis_since_boot()),
        }
    }
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wall(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S")),
            Self::Boot(millis) => write!(f, "{millis}"),
        }
    }
}

/// One buffered log entry awaiting the durable sink.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub stamp: Stamp,
}

impl LogEntry {
    pub fn new(level: Level, message: String, stamp: Stamp) -> Self {
        Self {
            level,
            message,
            stamp,
        }
    }

    /// Render this entry as a sink line.
    pub fn format_line(&self) -> String {
        format_line(self.level, &self.message, &self.stamp)
    }
}

/// Render a log line: `[timestamp] [LEVEL] message\n`.
pub fn format_line(level: Level, message: &str, stamp: &Stamp) -> String {
    format!("[{stamp}] [{}] {message}\n", level.label())
}
