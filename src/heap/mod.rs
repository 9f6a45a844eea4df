//! Heap telemetry abstraction.
//!
//! The admission coordinator and the log pipeline never query the platform
//! allocator directly. They depend on the [`HeapMonitor`] trait, which
//! decouples admission decisions from any particular way of measuring free
//! memory:
//!
//! - [`SystemHeapMonitor`]: production monitor backed by the operating
//!   system's memory accounting
//! - [`SimulatedHeap`]: settable monitor for tests and for hosts that track
//!   their own heap budget

mod monitor;

pub use monitor::{HeapMonitor, SimulatedHeap, SystemHeapMonitor};
