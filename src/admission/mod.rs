//! Cooperative memory admission.
//!
//! This module is the single source of truth for "is it safe to allocate N
//! bytes right now at priority P". Cooperating tasks request an advisory
//! lease before any allocation-heavy operation and release it afterwards;
//! when a request cannot be satisfied, the coordinator fans out to
//! registered cleanup callbacks and waits (bounded) for memory to return.
//!
//! See [`MemoryCoordinator`] for the admission model and
//! [`Priority`] for the inverted reserve semantics.

mod cleanup;
mod config;
mod coordinator;
mod lease;
mod status;

pub use config::CoordinatorConfig;
pub use coordinator::{MemoryCoordinator, MAX_ACTIVE_OPERATIONS};
pub use lease::{Lease, OperationKind, Priority};
pub use status::{LeaseSnapshot, MemoryStatus};
