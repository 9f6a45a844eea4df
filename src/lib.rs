//! heapwarden - Cooperative heap admission for constrained devices
//!
//! This library provides a process-wide memory admission coordinator and a
//! memory-pressure-aware buffered log pipeline for devices with a single
//! small shared heap and many concurrent tasks. Tasks lease memory before
//! allocation-heavy work, cooperating subsystems register cleanup
//! callbacks, and the logger degrades (drop history, skip flushes) instead
//! of ever crashing the process.
//!
//! # High-Level API
//!
//! ```
//! use heapwarden::admission::{CoordinatorConfig, MemoryCoordinator, OperationKind, Priority};
//! use heapwarden::bus::StorageBus;
//! use heapwarden::clock::SystemClock;
//! use heapwarden::heap::SimulatedHeap;
//! use heapwarden::logger::{BufferedLogger, ConsoleSink};
//! use std::sync::Arc;
//!
//! // Startup: construct the shared context objects once.
//! let heap = Arc::new(SimulatedHeap::new(120_000));
//! let coordinator = Arc::new(MemoryCoordinator::new(
//!     heap.clone(),
//!     CoordinatorConfig::with_thresholds(10_000, 5_000),
//! ));
//! let logger = Arc::new(BufferedLogger::new(
//!     coordinator.clone(),
//!     heap.clone(),
//!     Arc::new(SystemClock::new()),
//!     StorageBus::new(),
//!     Arc::new(ConsoleSink::new()),
//! ));
//!
//! // A subsystem leases memory around an allocation-heavy operation.
//! if coordinator.request(OperationKind::HttpRequest, Priority::Normal, 8_192, "weather") {
//!     // ... fetch and parse ...
//!     coordinator.release(OperationKind::HttpRequest, "weather");
//! } else {
//!     logger.warning("weather fetch skipped: memory pressure");
//! }
//! ```

pub mod admission;
pub mod bus;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod heap;
pub mod logger;

/// Version of the heapwarden library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
