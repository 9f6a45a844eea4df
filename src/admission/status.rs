//! Coordinator telemetry snapshots.

use crate::admission::lease::{OperationKind, Priority};
use std::time::Duration;

/// Point-in-time view of one active lease.
#[derive(Clone, Debug)]
pub struct LeaseSnapshot {
    /// Subsystem that requested the lease.
    pub owner: String,
    /// Workload category.
    pub kind: OperationKind,
    /// Admission priority.
    pub priority: Priority,
    /// Caller-supplied byte estimate.
    pub estimated_bytes: usize,
    /// Time since the lease was granted.
    pub age: Duration,
}

/// Point-in-time view of the coordinator's heap and lease state.
///
/// Produced by [`crate::admission::MemoryCoordinator::status`] for
/// embedding UIs and diagnostics; the same data backs `log_status`.
#[derive(Clone, Debug)]
pub struct MemoryStatus {
    /// Current free heap in bytes.
    pub free_heap: usize,
    /// Lowest free heap observed since startup.
    pub minimum_free_heap: usize,
    /// Sum of estimated bytes across active leases.
    pub estimated_bytes_in_use: usize,
    /// Number of active leases.
    pub active_operations: usize,
    /// Per-lease breakdown. Empty when the lease table could not be
    /// inspected within the status lock budget.
    pub leases: Vec<LeaseSnapshot>,
}
