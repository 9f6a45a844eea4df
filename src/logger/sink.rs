//! Immediate-sink abstraction.
//!
//! The immediate sink is the low-latency, always-synchronous half of the
//! pipeline: a console on development builds, a serial port on the device.
//! Components depend on the [`ImmediateSink`] trait rather than a concrete
//! output so tests can capture lines and headless deployments can route
//! them into the diagnostics subscriber.

use parking_lot::Mutex;
use std::io::Write;

/// A synchronous, line-oriented log output.
///
/// Implementations must be `Send + Sync`. Writes are best-effort: a sink
/// that fails must absorb the failure, never surface it to the logger.
pub trait ImmediateSink: Send + Sync {
    /// Write one formatted line (trailing newline included).
    fn write_line(&self, line: &str);
}

/// Immediate sink backed by stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl ImmediateSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(line.as_bytes());
        let _ = handle.flush();
    }
}

/// Immediate sink that routes lines into the `tracing` subscriber.
///
/// Useful when the embedding application already ships diagnostics through
/// [`crate::diagnostics`] and wants application log lines in the same
/// place.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl ImmediateSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!(target: "heapwarden::sink", "{}", line.trim_end());
    }
}

/// A sink that discards everything.
///
/// Useful for benchmarks and for tests where console output is noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ImmediateSink for NoOpSink {
    #[inline]
    fn write_line(&self, _line: &str) {
        // Intentionally empty.
    }
}

/// A sink that captures lines in memory for assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl ImmediateSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
