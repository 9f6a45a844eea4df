//! The buffered dual-sink log pipeline.
//!
//! Every accepted message is written synchronously to the immediate sink
//! and, when the durable sink is enabled, queued in the adaptive buffer for
//! batched file writes. Batch I/O is gated by the admission coordinator,
//! bounded by the shared storage bus, and aborted under memory pressure.
//! No call on this type ever fails observably to its caller: every
//! degraded path drops work silently and `log()` always returns.
//!
//! # Lock domains
//!
//! The pipeline owns two locks that are never merged: the format lock
//! (serializes formatting, immediate-sink writes, and sink configuration)
//! and the buffer lock (guards the adaptive buffer). File writes happen
//! outside both, holding only the storage bus.

use crate::admission::{MemoryCoordinator, OperationKind, Priority};
use crate::bus::StorageBus;
use crate::clock::Clock;
use crate::config::LoggerSettings;
use crate::heap::HeapMonitor;
use crate::logger::buffer::AdaptiveBuffer;
use crate::logger::entry::{format_line, LogEntry, Stamp};
use crate::logger::filename::generate_log_filename;
use crate::logger::level::Level;
use crate::logger::sink::ImmediateSink;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

// =============================================================================
// Pipeline timing and pressure constants
// =============================================================================

/// Format-lock budget; on timeout the line goes straight to the immediate
/// sink without buffering.
const FORMAT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Buffer-lock budget for appends and length reads.
const BUFFER_LOCK_TIMEOUT: Duration = Duration::from_millis(100);

/// Buffer-lock budget while detaching the buffer for a flush.
const FLUSH_DRAIN_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Buffer-lock budget for the emergency clear in the pressure sweep.
const EMERGENCY_LOCK_TIMEOUT: Duration = Duration::from_millis(50);

/// Estimated bytes reserved from the coordinator per flush.
const FLUSH_LEASE_BYTES: usize = 2_048;

/// Lease owner name for the flush path.
const FLUSH_OWNER: &str = "logger-flush";

/// Abort a running batch write when free heap falls below this.
const FLUSH_ABORT_FLOOR: usize = 2_048;

/// Skip a scheduled flush entirely when free heap is below this.
const FLUSH_GATE: usize = 12_288;

/// Yield to other tasks after this many entries in a batch write.
const WRITE_YIELD_EVERY: usize = 5;

/// Duration of the per-chunk yield.
const WRITE_YIELD: Duration = Duration::from_millis(1);

/// Cadence of the memory-pressure sweep in the flush cycle.
const PRESSURE_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Pressure sweeps per flush attempt (15 s flush cadence).
const SWEEPS_PER_FLUSH: u32 = 15;

/// Emit a status line every this many flush cycles.
const STATUS_EVERY_CYCLES: u32 = 10;

/// Sink configuration applied by [`BufferedLogger::configure`].
///
/// The boot-time default is conservative: immediate sink only, everything
/// at `Debug` and above, no durable sink until the application
/// configuration has been loaded.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Write formatted lines to the immediate sink.
    pub immediate_enabled: bool,
    /// Buffer entries for the durable sink.
    pub file_enabled: bool,
    /// Durable sink path.
    pub file_path: PathBuf,
    /// Minimum accepted level; anything below is dropped silently.
    pub minimum_level: Level,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            immediate_enabled: true,
            file_enabled: false,
            file_path: PathBuf::from("/boot.log"),
            minimum_level: Level::Debug,
        }
    }
}

/// Thread-safe dual-sink logger.
///
/// Constructed once at startup with boot defaults, then reconfigured after
/// the application configuration is loaded. Reconfiguration fully replaces
/// the sink settings; it never merges.
///
/// # Example
///
/// ```
/// use heapwarden::admission::{CoordinatorConfig, MemoryCoordinator};
/// use heapwarden::bus::StorageBus;
/// use heapwarden::clock::SystemClock;
/// use heapwarden::heap::SimulatedHeap;
/// use heapwarden::logger::{BufferedLogger, Level, MemorySink};
/// use std::sync::Arc;
///
/// let heap = Arc::new(SimulatedHeap::new(50_000));
/// let coordinator = Arc::new(MemoryCoordinator::new(
///     heap.clone(),
///     CoordinatorConfig::default(),
/// ));
/// let sink = Arc::new(MemorySink::new());
/// let logger = BufferedLogger::new(
///     coordinator,
///     heap,
///     Arc::new(SystemClock::new()),
///     StorageBus::new(),
///     sink.clone(),
/// );
///
/// logger.info("station online");
/// assert_eq!(sink.len(), 1);
/// ```
pub struct BufferedLogger {
    coordinator: Arc<MemoryCoordinator>,
    heap: Arc<dyn HeapMonitor>,
    clock: Arc<dyn Clock>,
    bus: StorageBus,
    immediate: Arc<dyn ImmediateSink>,
    /// Format/config lock domain; the guarded value is the durable-sink
    /// path, and holding the guard serializes immediate-sink writes.
    format_lock: Mutex<PathBuf>,
    buffer: Mutex<AdaptiveBuffer>,
    min_level: AtomicU8,
    immediate_enabled: AtomicBool,
    file_enabled: AtomicBool,
}

impl BufferedLogger {
    /// Create a pipeline with boot defaults (immediate sink only).
    pub fn new(
        coordinator: Arc<MemoryCoordinator>,
        heap: Arc<dyn HeapMonitor>,
        clock: Arc<dyn Clock>,
        bus: StorageBus,
        immediate: Arc<dyn ImmediateSink>,
    ) -> Self {
        let boot = PipelineConfig::default();
        Self {
            coordinator,
            heap,
            clock,
            bus,
            immediate,
            format_lock: Mutex::new(boot.file_path.clone()),
            buffer: Mutex::new(AdaptiveBuffer::new()),
            min_level: AtomicU8::new(level_ordinal(boot.minimum_level)),
            immediate_enabled: AtomicBool::new(boot.immediate_enabled),
            file_enabled: AtomicBool::new(boot.file_enabled),
        }
    }

    /// Replace the sink configuration.
    ///
    /// Called once at boot (implicitly, via the constructor defaults) and
    /// once more after the application configuration is loaded. The new
    /// configuration replaces the old one wholesale.
    pub fn configure(&self, config: PipelineConfig) {
        let Some(mut path) = self.format_lock.try_lock_for(FORMAT_LOCK_TIMEOUT) else {
            warn!("logger reconfiguration skipped: format lock busy");
            return;
        };
        *path = config.file_path;
        self.min_level
            .store(level_ordinal(config.minimum_level), Ordering::Release);
        self.immediate_enabled
            .store(config.immediate_enabled, Ordering::Release);
        self.file_enabled
            .store(config.file_enabled, Ordering::Release);
        info!(
            immediate = config.immediate_enabled,
            file = config.file_enabled,
            level = %config.minimum_level,
            path = %path.display(),
            "logger configured"
        );
    }

    /// Apply loaded application settings: level, durable-sink switch, and a
    /// freshly generated filename.
    pub fn configure_from_settings(&self, settings: &LoggerSettings) {
        let path = generate_log_filename(
            &settings.file_prefix,
            settings.include_date_in_filename,
            self.clock.as_ref(),
        );
        self.configure(PipelineConfig {
            immediate_enabled: true,
            file_enabled: settings.file_logging_enabled,
            file_path: path,
            minimum_level: settings.log_level,
        });
    }

    /// Minimum accepted level.
    pub fn minimum_level(&self) -> Level {
        level_from_ordinal(self.min_level.load(Ordering::Acquire))
    }

    /// Log a message at the given level.
    ///
    /// Messages below the minimum level are dropped before any lock. On
    /// format-lock contention the line is written to the immediate sink
    /// only, bypassing buffering, so logging never blocks indefinitely.
    pub fn log(&self, level: Level, message: &str) {
        if level_ordinal(level) < self.min_level.load(Ordering::Acquire) {
            return;
        }

        let stamp = Stamp::capture(self.clock.as_ref());
        let line = format_line(level, message, &stamp);

        match self.format_lock.try_lock_for(FORMAT_LOCK_TIMEOUT) {
            Some(_path) => {
                if self.immediate_enabled.load(Ordering::Acquire) {
                    self.immediate.write_line(&line);
                }
            }
            None => {
                if self.immediate_enabled.load(Ordering::Acquire) {
                    self.immediate.write_line(&line);
                }
                return;
            }
        }

        // Buffer hand-off runs outside the format lock: slow buffer
        // contention must never delay immediate-sink output.
        if self.file_enabled.load(Ordering::Acquire) {
            self.append_to_buffer(level, message, stamp);
        }
    }

    /// Log at `Debug`.
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Log at `Info`.
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Log at `Warning`.
    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    /// Log at `Error`.
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Number of entries currently buffered for the durable sink.
    pub fn buffered_len(&self) -> usize {
        self.buffer
            .try_lock_for(BUFFER_LOCK_TIMEOUT)
            .map(|b| b.len())
            .unwrap_or(0)
    }

    /// Flush the buffer to the durable sink.
    ///
    /// Requests a background-priority lease first; a denial skips the whole
    /// cycle (the next scheduled flush retries). The buffer is detached
    /// under its lock and written outside it, so new log calls are never
    /// blocked by storage I/O. A batch aborts once free heap falls below
    /// the abort floor: the prefix written so far stays, the remainder is
    /// dropped, nothing is re-queued.
    pub fn flush_to_file(&self) {
        if !self.coordinator.request(
            OperationKind::ConfigOperation,
            Priority::Background,
            FLUSH_LEASE_BYTES,
            FLUSH_OWNER,
        ) {
            debug!("flush skipped: admission denied");
            return;
        }

        let drained = match self.buffer.try_lock_for(FLUSH_DRAIN_LOCK_TIMEOUT) {
            Some(mut buffer) => buffer.take_all(),
            None => VecDeque::new(),
        };

        if !drained.is_empty() {
            self.write_batch(&drained);
        }

        self.coordinator
            .release(OperationKind::ConfigOperation, FLUSH_OWNER);
    }

    /// Append a batch to the durable sink under the storage bus.
    fn write_batch(&self, entries: &VecDeque<LogEntry>) {
        let Some(_bus) = self.bus.acquire_batch() else {
            debug!("flush skipped: storage bus busy");
            return;
        };
        let path = match self.format_lock.try_lock_for(FORMAT_LOCK_TIMEOUT) {
            Some(path) => path.clone(),
            None => return,
        };
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
            debug!(path = %path.display(), "flush skipped: durable sink unavailable");
            return;
        };

        for (i, entry) in entries.iter().enumerate() {
            if self.heap.free_bytes() < FLUSH_ABORT_FLOOR {
                warn!(
                    written = i,
                    total = entries.len(),
                    "batch write aborted under memory pressure"
                );
                break;
            }
            let _ = file.write_all(entry.format_line().as_bytes());
            if i % WRITE_YIELD_EVERY == 0 {
                thread::sleep(WRITE_YIELD);
            }
        }
    }

    /// Long-lived flush-cycle body, scheduled by the embedding application
    /// (or by [`crate::logger::FlushDaemon`]).
    ///
    /// Every second: if the coordinator reports critical memory and the
    /// buffer is non-empty, the buffer is dropped on the spot and a global
    /// cleanup pass is forced; buffered history is reclaimed faster than
    /// the admission-time cleanup path would manage. Every fifteen seconds
    /// a flush is attempted, gated on sufficient free heap; every tenth
    /// flush cycle a status line goes to the immediate sink.
    pub fn run_flush_cycle(&self, shutdown: &AtomicBool) {
        let mut cycle: u32 = 0;
        let mut emergency_clears: u32 = 0;
        info!("log flush cycle started");

        loop {
            for _ in 0..SWEEPS_PER_FLUSH {
                if shutdown.load(Ordering::Relaxed) {
                    debug!("log flush cycle stopping");
                    return;
                }
                thread::sleep(PRESSURE_SWEEP_INTERVAL);

                if self.coordinator.is_memory_critical() && self.emergency_clear() {
                    emergency_clears += 1;
                    self.immediate.write_line(&format!(
                        "[logger] emergency buffer clear, free heap: {} bytes\n",
                        self.heap.free_bytes()
                    ));
                    self.coordinator.perform_global_cleanup();
                }
            }

            if self.file_enabled.load(Ordering::Acquire) {
                let free = self.heap.free_bytes();
                let buffered = self.buffered_len();

                if cycle % STATUS_EVERY_CYCLES == 0 {
                    self.immediate.write_line(&format!(
                        "[logger] memory: {free} bytes free, buffer: {buffered} entries, emergency clears: {emergency_clears}\n"
                    ));
                }

                if free >= FLUSH_GATE {
                    self.flush_to_file();
                } else {
                    self.immediate.write_line(&format!(
                        "[logger] skipping flush, low memory: {free} bytes\n"
                    ));
                }
                cycle += 1;
            }
        }
    }

    /// Hand a message to the adaptive buffer under current heap conditions.
    fn append_to_buffer(&self, level: Level, message: &str, stamp: Stamp) {
        let free = self.heap.free_bytes();
        if let Some(mut buffer) = self.buffer.try_lock_for(BUFFER_LOCK_TIMEOUT) {
            buffer.push(LogEntry::new(level, message.to_string(), stamp), free);
        }
    }

    /// Drop the buffer if it is non-empty. Returns whether anything was
    /// cleared.
    fn emergency_clear(&self) -> bool {
        let Some(mut buffer) = self.buffer.try_lock_for(EMERGENCY_LOCK_TIMEOUT) else {
            return false;
        };
        if buffer.is_empty() {
            return false;
        }
        buffer.clear();
        true
    }
}

impl std::fmt::Debug for BufferedLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedLogger")
            .field("minimum_level", &self.minimum_level())
            .field("file_enabled", &self.file_enabled.load(Ordering::Acquire))
            .field("buffered", &self.buffered_len())
            .finish()
    }
}

fn level_ordinal(level: Level) -> u8 {
    match level {
        Level::Debug => 0,
        Level::Info => 1,
        Level::Warning => 2,
        Level::Error => 3,
    }
}

fn level_from_ordinal(ordinal: u8) -> Level {
    match ordinal {
        0 => Level::Debug,
        1 => Level::Info,
        2 => Level::Warning,
        _ => Level::Error,
    }
}
