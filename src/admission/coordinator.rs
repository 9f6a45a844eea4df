//! The memory admission coordinator.
//!
//! A single [`MemoryCoordinator`] arbitrates heap usage across every
//! cooperating task in the process. Before any allocation-heavy operation,
//! a task requests a lease naming its workload kind, priority, and an
//! estimated byte cost; the coordinator grants the lease only when the free
//! heap covers the estimate plus the priority's required reserve. Denied
//! (non-quiet) requests trigger a cooperative cleanup fan-out and a bounded
//! wait before giving up.
//!
//! Leases are advisory. A task that allocates without requesting one is
//! invisible here; the design assumes all memory-significant subsystems
//! cooperate.
//!
//! # Thread Safety
//!
//! `MemoryCoordinator` is `Send + Sync` and is shared across tasks via
//! `Arc`. Every lock acquisition is timeout-bounded; no path blocks
//! indefinitely.

use crate::admission::cleanup::CleanupRegistry;
use crate::admission::config::CoordinatorConfig;
use crate::admission::lease::{Lease, OperationKind, Priority};
use crate::admission::status::{LeaseSnapshot, MemoryStatus};
use crate::heap::HeapMonitor;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// =============================================================================
// Admission timing constants
// =============================================================================

/// Maximum number of concurrently active leases.
pub const MAX_ACTIVE_OPERATIONS: usize = 16;

/// Lease-table lock budget for a full (non-quiet) request.
const REQUEST_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Lease-table lock budget for a quiet request.
const QUIET_REQUEST_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Lease-table lock budget for a release.
const RELEASE_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Lease-table lock budget for a quiet release.
const QUIET_RELEASE_LOCK_TIMEOUT: Duration = Duration::from_millis(100);

/// Lock budget for telemetry reads.
const STATUS_LOCK_TIMEOUT: Duration = Duration::from_millis(100);

/// Registry lock budget for callback registration and snapshotting.
const REGISTRY_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Re-check cadence while waiting for memory.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Status-log cadence while waiting for memory.
const WAIT_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Yield between cleanup callbacks so other tasks keep running.
const CLEANUP_YIELD: Duration = Duration::from_millis(10);

/// Settle time between the two allocator nudges of a cleanup pass.
const CLEANUP_SETTLE: Duration = Duration::from_millis(50);

// =============================================================================
// Lease table
// =============================================================================

/// Fixed-capacity slot table, linear-scanned by `(kind, owner)`.
struct LeaseTable {
    slots: Vec<Option<Lease>>,
    active: usize,
}

impl LeaseTable {
    fn new() -> Self {
        Self {
            slots: (0..MAX_ACTIVE_OPERATIONS).map(|_| None).collect(),
            active: 0,
        }
    }

    fn has_free_slot(&self) -> bool {
        self.active < MAX_ACTIVE_OPERATIONS
    }

    /// Place a lease in the first empty slot.
    fn insert(&mut self, lease: Lease) -> bool {
        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(lease);
                self.active += 1;
                return true;
            }
        }
        false
    }

    /// Remove the first lease matching the identity.
    fn remove(&mut self, kind: OperationKind, owner: &str) -> Option<Lease> {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|l| l.matches(kind, owner)) {
                self.active -= 1;
                return slot.take();
            }
        }
        None
    }

    fn estimated_bytes(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .map(|l| l.estimated_bytes)
            .sum()
    }

    fn snapshots(&self) -> Vec<LeaseSnapshot> {
        self.slots
            .iter()
            .flatten()
            .map(|l| LeaseSnapshot {
                owner: l.owner.clone(),
                kind: l.kind,
                priority: l.priority,
                estimated_bytes: l.estimated_bytes,
                age: l.started.elapsed(),
            })
            .collect()
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Process-wide memory admission coordinator.
///
/// Constructed once at startup and shared via `Arc`; see the module docs
/// for the admission model.
///
/// # Example
///
/// ```
/// use heapwarden::admission::{CoordinatorConfig, MemoryCoordinator, OperationKind, Priority};
/// use heapwarden::heap::SimulatedHeap;
/// use std::sync::Arc;
///
/// let heap = Arc::new(SimulatedHeap::new(50_000));
/// let coordinator = MemoryCoordinator::new(heap, CoordinatorConfig::default());
///
/// assert!(coordinator.request(
///     OperationKind::HttpRequest,
///     Priority::Normal,
///     4_096,
///     "weather",
/// ));
/// coordinator.release(OperationKind::HttpRequest, "weather");
/// ```
pub struct MemoryCoordinator {
    heap: Arc<dyn HeapMonitor>,
    config: CoordinatorConfig,
    leases: Mutex<LeaseTable>,
    cleanups: Mutex<CleanupRegistry>,
    minimum_free_heap: AtomicUsize,
}

impl MemoryCoordinator {
    /// Create a coordinator over the given heap monitor.
    pub fn new(heap: Arc<dyn HeapMonitor>, config: CoordinatorConfig) -> Self {
        let coordinator = Self {
            minimum_free_heap: AtomicUsize::new(heap.free_bytes()),
            heap,
            config,
            leases: Mutex::new(LeaseTable::new()),
            cleanups: Mutex::new(CleanupRegistry::new()),
        };
        info!(
            low = coordinator.config.low_threshold,
            critical = coordinator.config.critical_threshold,
            "memory coordinator initialized"
        );
        coordinator
    }

    /// Request a lease for an allocation-bearing operation.
    ///
    /// Returns `true` when the lease was granted. On a denied admission
    /// check this runs a global cleanup pass and waits (bounded by the
    /// configured timeout, re-checking every 500 ms) for memory to come
    /// back before failing. Slot exhaustion fails immediately, since
    /// cleanup can free bytes but not lease slots.
    ///
    /// The granted lease is identified by `(kind, owner)` and must be
    /// returned with [`release`](Self::release). Callers must not request
    /// the same identity twice without releasing in between.
    pub fn request(
        &self,
        kind: OperationKind,
        priority: Priority,
        estimated_bytes: usize,
        owner: &str,
    ) -> bool {
        if owner.is_empty() {
            warn!("memory request with empty owner name refused");
            return false;
        }
        debug!(
            owner,
            estimated_bytes,
            free = self.heap.free_bytes(),
            "memory requested"
        );

        let Some(mut table) = self.leases.try_lock_for(REQUEST_LOCK_TIMEOUT) else {
            warn!(owner, "lease table lock timed out; request refused");
            return false;
        };

        if !table.has_free_slot() {
            info!(
                owner,
                active = table.active,
                max = MAX_ACTIVE_OPERATIONS,
                "no lease slot available"
            );
            return false;
        }

        if !self.can_allocate(estimated_bytes, priority) {
            let free = self.heap.free_bytes();
            let reserve = priority.required_reserve(&self.config);
            info!(
                owner,
                estimated_bytes,
                free,
                reserve,
                needed = estimated_bytes.saturating_add(reserve),
                %priority,
                "admission denied; starting cleanup"
            );

            // Cleanup and waiting happen without the table lock so other
            // tasks can release their leases in the meantime.
            drop(table);
            self.perform_global_cleanup();
            self.wait_for_memory(estimated_bytes, priority);

            table = match self.leases.try_lock_for(REQUEST_LOCK_TIMEOUT) {
                Some(t) => t,
                None => {
                    warn!(owner, "failed to re-acquire lease table after cleanup");
                    return false;
                }
            };
            if !self.can_allocate(estimated_bytes, priority) {
                info!(owner, "memory still unavailable after cleanup");
                return false;
            }
            if !table.has_free_slot() {
                info!(owner, "no lease slot available after cleanup wait");
                return false;
            }
        }

        if !table.insert(Lease::new(kind, priority, estimated_bytes, owner)) {
            warn!(owner, "lease table inconsistent; request refused");
            return false;
        }
        let active = table.active;
        drop(table);

        self.update_watermark();
        info!(
            owner,
            estimated_bytes,
            %priority,
            active,
            free = self.heap.free_bytes(),
            "lease granted"
        );
        true
    }

    /// Request a lease without cleanup or waiting.
    ///
    /// Same admission arithmetic as [`request`](Self::request), but any
    /// failure (lock contention, slot exhaustion, insufficient heap)
    /// returns `false` immediately. Intended for high-frequency callers
    /// where blocking would stall a hot path.
    pub fn request_quiet(
        &self,
        kind: OperationKind,
        priority: Priority,
        estimated_bytes: usize,
        owner: &str,
    ) -> bool {
        if owner.is_empty() {
            return false;
        }

        let Some(mut table) = self.leases.try_lock_for(QUIET_REQUEST_LOCK_TIMEOUT) else {
            return false;
        };
        if !table.has_free_slot() || !self.can_allocate(estimated_bytes, priority) {
            debug!(owner, estimated_bytes, "quiet memory request denied");
            return false;
        }
        if !table.insert(Lease::new(kind, priority, estimated_bytes, owner)) {
            return false;
        }
        drop(table);

        self.update_watermark();
        true
    }

    /// Release a lease by identity.
    ///
    /// A release with no matching lease is a logged no-op. Always follows
    /// up with an allocator nudge, the only lever available to encourage
    /// compaction after a large operation retires.
    pub fn release(&self, kind: OperationKind, owner: &str) {
        let Some(mut table) = self.leases.try_lock_for(RELEASE_LOCK_TIMEOUT) else {
            warn!(owner, "lease table lock timed out; release skipped");
            return;
        };
        match table.remove(kind, owner) {
            Some(lease) => {
                let active = table.active;
                drop(table);
                info!(
                    owner,
                    released_bytes = lease.estimated_bytes,
                    active,
                    free = self.heap.free_bytes(),
                    "lease released"
                );
            }
            None => {
                drop(table);
                info!(owner, %kind, "release for unknown lease ignored");
            }
        }

        self.heap.nudge();
        self.update_watermark();
    }

    /// Release a lease without logging.
    pub fn release_quiet(&self, kind: OperationKind, owner: &str) {
        let Some(mut table) = self.leases.try_lock_for(QUIET_RELEASE_LOCK_TIMEOUT) else {
            return;
        };
        table.remove(kind, owner);
        drop(table);

        self.heap.nudge();
        self.update_watermark();
    }

    /// Register a cleanup callback invoked during global cleanup passes.
    ///
    /// Registrations past the capacity ceiling are silently dropped.
    /// Duplicate registrations by the same owner are kept and all fire.
    /// There is no unregistration.
    pub fn register_cleanup<F>(&self, owner: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let Some(mut registry) = self.cleanups.try_lock_for(REGISTRY_LOCK_TIMEOUT) else {
            return;
        };
        if registry.register(owner, Arc::new(callback)) {
            info!(owner, "cleanup callback registered");
        } else {
            debug!(owner, "cleanup callback dropped (registry full or owner empty)");
        }
    }

    /// Run a global cleanup pass: every registered callback in
    /// registration order with a short yield between them, then two
    /// allocator nudges.
    ///
    /// Public so pressure-handling tasks (the log pipeline's flush cycle)
    /// can force a pass without going through a denied request.
    pub fn perform_global_cleanup(&self) {
        info!("starting global cleanup pass");
        let started = Instant::now();
        let before = self.heap.free_bytes();

        // Snapshot under the registry lock, invoke without it, so callbacks
        // may call back into the coordinator.
        let snapshot = match self.cleanups.try_lock_for(REGISTRY_LOCK_TIMEOUT) {
            Some(registry) => registry.snapshot(),
            None => Vec::new(),
        };
        for entry in &snapshot {
            debug!(owner = %entry.owner, "invoking cleanup callback");
            (entry.callback)();
            thread::sleep(CLEANUP_YIELD);
        }

        self.heap.nudge();
        thread::sleep(CLEANUP_SETTLE);
        self.heap.nudge();

        let after = self.heap.free_bytes();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            freed = after.saturating_sub(before),
            before,
            after,
            "global cleanup finished"
        );
    }

    /// True when free heap is below the low threshold.
    pub fn is_memory_low(&self) -> bool {
        self.heap.free_bytes() < self.config.low_threshold
    }

    /// True when free heap is below the critical threshold.
    pub fn is_memory_critical(&self) -> bool {
        self.heap.free_bytes() < self.config.critical_threshold
    }

    /// Current free heap in bytes.
    pub fn free_heap(&self) -> usize {
        self.heap.free_bytes()
    }

    /// Lowest free heap observed since construction.
    pub fn minimum_free_heap(&self) -> usize {
        self.minimum_free_heap.load(Ordering::Acquire)
    }

    /// Sum of estimated bytes across active leases, or 0 when the table
    /// could not be inspected within the telemetry lock budget.
    pub fn estimated_bytes_in_use(&self) -> usize {
        self.leases
            .try_lock_for(STATUS_LOCK_TIMEOUT)
            .map(|t| t.estimated_bytes())
            .unwrap_or(0)
    }

    /// Number of active leases.
    pub fn active_operations(&self) -> usize {
        self.leases
            .try_lock_for(STATUS_LOCK_TIMEOUT)
            .map(|t| t.active)
            .unwrap_or(0)
    }

    /// Structured telemetry snapshot.
    pub fn status(&self) -> MemoryStatus {
        let free = self.heap.free_bytes();
        let (active, estimated, leases) = match self.leases.try_lock_for(STATUS_LOCK_TIMEOUT) {
            Some(table) => (table.active, table.estimated_bytes(), table.snapshots()),
            None => (0, 0, Vec::new()),
        };
        MemoryStatus {
            free_heap: free,
            minimum_free_heap: self.minimum_free_heap(),
            estimated_bytes_in_use: estimated,
            active_operations: active,
            leases,
        }
    }

    /// Emit the current status through the diagnostics channel, one summary
    /// line plus one line per active lease.
    pub fn log_status(&self, context: &str) {
        let status = self.status();
        info!(
            context,
            free = status.free_heap,
            minimum = status.minimum_free_heap,
            estimated = status.estimated_bytes_in_use,
            active = status.active_operations,
            "memory status"
        );
        for lease in &status.leases {
            info!(
                owner = %lease.owner,
                kind = %lease.kind,
                priority = %lease.priority,
                bytes = lease.estimated_bytes,
                age_ms = lease.age.as_millis() as u64,
                "active lease"
            );
        }
    }

    /// Admission check: free heap must cover the estimate plus the
    /// priority's reserve.
    fn can_allocate(&self, bytes: usize, priority: Priority) -> bool {
        let free = self.heap.free_bytes();
        let reserve = priority.required_reserve(&self.config);
        free >= bytes.saturating_add(reserve)
    }

    /// Block-and-poll until admission would succeed or the configured wait
    /// timeout elapses. Logs status every few seconds while waiting.
    fn wait_for_memory(&self, bytes: usize, priority: Priority) {
        let started = Instant::now();
        let mut last_log = started;
        info!(bytes, "waiting for memory to become available");

        while started.elapsed() < self.config.wait_timeout {
            if self.can_allocate(bytes, priority) {
                info!(
                    waited_ms = started.elapsed().as_millis() as u64,
                    "memory became available"
                );
                return;
            }
            if last_log.elapsed() >= WAIT_LOG_INTERVAL {
                self.log_status("waiting");
                last_log = Instant::now();
            }
            thread::sleep(WAIT_POLL_INTERVAL.min(self.config.wait_timeout));
        }

        warn!(
            timeout_ms = self.config.wait_timeout.as_millis() as u64,
            "timed out waiting for memory"
        );
    }

    /// Record a new minimum-free-heap watermark if the current reading is
    /// lower than anything seen so far.
    fn update_watermark(&self) {
        let current = self.heap.free_bytes();
        let mut minimum = self.minimum_free_heap.load(Ordering::Acquire);
        while current < minimum {
            match self.minimum_free_heap.compare_exchange_weak(
                minimum,
                current,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(m) => minimum = m,
            }
        }
    }
}

impl std::fmt::Debug for MemoryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCoordinator")
            .field("free_heap", &self.free_heap())
            .field("active_operations", &self.active_operations())
            .field("low_threshold", &self.config.low_threshold)
            .field("critical_threshold", &self.config.critical_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::SimulatedHeap;

    fn coordinator_with(
        free: usize,
        low: usize,
        critical: usize,
    ) -> (Arc<SimulatedHeap>, MemoryCoordinator) {
        let heap = Arc::new(SimulatedHeap::new(free));
        let config = CoordinatorConfig::with_thresholds(low, critical)
            .with_wait_timeout(Duration::from_millis(50));
        let coordinator = MemoryCoordinator::new(Arc::clone(&heap) as Arc<dyn HeapMonitor>, config);
        (heap, coordinator)
    }

    #[test]
    fn test_request_release_lifecycle() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);

        assert!(coordinator.request(
            OperationKind::HttpRequest,
            Priority::Normal,
            3_000,
            "weather",
        ));
        assert_eq!(coordinator.active_operations(), 1);
        assert_eq!(coordinator.estimated_bytes_in_use(), 3_000);

        coordinator.release(OperationKind::HttpRequest, "weather");
        assert_eq!(coordinator.active_operations(), 0);
        assert_eq!(coordinator.estimated_bytes_in_use(), 0);
    }

    #[test]
    fn test_normal_priority_admission_arithmetic() {
        // free = 15000, low threshold = 10000, estimate = 3000:
        // 3000 + 10000 = 13000 <= 15000, so the request succeeds.
        let (_heap, coordinator) = coordinator_with(15_000, 10_000, 5_000);

        assert!(coordinator.request(
            OperationKind::DataProcessing,
            Priority::Normal,
            3_000,
            "parser",
        ));
        assert_eq!(coordinator.active_operations(), 1);
    }

    #[test]
    fn test_critical_admitted_where_normal_denied() {
        // free = 8000, critical threshold = 5000: critical reserve is 2500,
        // so 3000 + 2500 = 5500 <= 8000 succeeds. The same estimate at
        // normal priority needs 3000 + 10000 = 13000 and fails.
        let (_heap, coordinator) = coordinator_with(8_000, 10_000, 5_000);

        assert!(!coordinator.request_quiet(
            OperationKind::DataProcessing,
            Priority::Normal,
            3_000,
            "parser",
        ));
        assert!(coordinator.request(
            OperationKind::ConfigOperation,
            Priority::Critical,
            3_000,
            "wifi",
        ));
    }

    #[test]
    fn test_reserve_monotonicity() {
        // Anything admitted under a stricter reserve must also be admitted
        // under a looser one at the same heap level.
        let (_heap, coordinator) = coordinator_with(26_000, 10_000, 5_000);
        let estimate = 5_000;

        // Background needs 5000 + 20000 = 25000 <= 26000: admitted.
        assert!(coordinator.request_quiet(
            OperationKind::DataProcessing,
            Priority::Background,
            estimate,
            "bg",
        ));
        // Everything stricter-or-equal in ordering must then also pass.
        for (priority, owner) in [
            (Priority::Normal, "normal"),
            (Priority::Important, "important"),
            (Priority::Critical, "critical"),
        ] {
            assert!(
                coordinator.request_quiet(OperationKind::DataProcessing, priority, estimate, owner),
                "{priority} should be admitted when background was"
            );
        }
    }

    #[test]
    fn test_slot_exhaustion_fails_without_cleanup() {
        let (_heap, coordinator) = coordinator_with(1_000_000, 10_000, 5_000);
        let cleanups = Arc::new(AtomicUsize::new(0));
        {
            let cleanups = Arc::clone(&cleanups);
            coordinator.register_cleanup("counter", move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            });
        }

        for i in 0..MAX_ACTIVE_OPERATIONS {
            assert!(coordinator.request(
                OperationKind::DataProcessing,
                Priority::Normal,
                100,
                &format!("task-{i}"),
            ));
        }
        assert_eq!(coordinator.active_operations(), MAX_ACTIVE_OPERATIONS);

        // Seventeenth request fails fast: no slots, and no cleanup pass
        // because cleanup cannot free slots.
        assert!(!coordinator.request(
            OperationKind::DataProcessing,
            Priority::Normal,
            100,
            "task-overflow",
        ));
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);

        for i in 0..MAX_ACTIVE_OPERATIONS {
            coordinator.release(OperationKind::DataProcessing, &format!("task-{i}"));
        }
        assert_eq!(coordinator.active_operations(), 0);
    }

    #[test]
    fn test_denied_request_recovers_after_cleanup() {
        let (heap, coordinator) = coordinator_with(5_000, 10_000, 5_000);
        let heap_for_cleanup = Arc::clone(&heap);
        coordinator.register_cleanup("cache", move || {
            // A cooperating subsystem frees its cache.
            heap_for_cleanup.set_free_bytes(30_000);
        });

        assert!(coordinator.request(
            OperationKind::JsonParsing,
            Priority::Normal,
            1_000,
            "weather",
        ));
        assert_eq!(coordinator.active_operations(), 1);
    }

    #[test]
    fn test_denied_request_times_out_without_help() {
        let (_heap, coordinator) = coordinator_with(5_000, 10_000, 5_000);

        let started = Instant::now();
        assert!(!coordinator.request(
            OperationKind::JsonParsing,
            Priority::Normal,
            1_000,
            "weather",
        ));
        // Bounded by the 50ms test wait timeout plus cleanup-pass sleeps.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(coordinator.active_operations(), 0);
    }

    #[test]
    fn test_quiet_request_never_waits() {
        let (_heap, coordinator) = coordinator_with(5_000, 10_000, 5_000);
        let cleanups = Arc::new(AtomicUsize::new(0));
        {
            let cleanups = Arc::clone(&cleanups);
            coordinator.register_cleanup("counter", move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            });
        }

        let started = Instant::now();
        assert!(!coordinator.request_quiet(
            OperationKind::DisplayUpdate,
            Priority::Normal,
            1_000,
            "display",
        ));
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(cleanups.load(Ordering::SeqCst), 0, "quiet path must not clean up");
    }

    #[test]
    fn test_release_unknown_lease_is_noop() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        coordinator.release(OperationKind::HttpRequest, "never-requested");
        coordinator.release_quiet(OperationKind::HttpRequest, "never-requested");
        assert_eq!(coordinator.active_operations(), 0);
    }

    #[test]
    fn test_empty_owner_refused() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        assert!(!coordinator.request(OperationKind::HttpRequest, Priority::Normal, 100, ""));
        assert!(!coordinator.request_quiet(OperationKind::HttpRequest, Priority::Normal, 100, ""));
    }

    #[test]
    fn test_lease_identity_is_kind_plus_owner() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);

        assert!(coordinator.request_quiet(
            OperationKind::HttpRequest,
            Priority::Normal,
            1_000,
            "weather",
        ));
        assert!(coordinator.request_quiet(
            OperationKind::JsonParsing,
            Priority::Normal,
            2_000,
            "weather",
        ));
        assert_eq!(coordinator.active_operations(), 2);

        // Releasing one kind leaves the other lease in place.
        coordinator.release(OperationKind::HttpRequest, "weather");
        assert_eq!(coordinator.active_operations(), 1);
        assert_eq!(coordinator.estimated_bytes_in_use(), 2_000);

        coordinator.release(OperationKind::JsonParsing, "weather");
        assert_eq!(coordinator.active_operations(), 0);
    }

    #[test]
    fn test_watermark_tracks_minimum() {
        let (heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        assert_eq!(coordinator.minimum_free_heap(), 50_000);

        heap.set_free_bytes(12_000);
        assert!(coordinator.request_quiet(
            OperationKind::DisplayUpdate,
            Priority::Critical,
            100,
            "display",
        ));
        assert_eq!(coordinator.minimum_free_heap(), 12_000);

        // The watermark never rises again.
        heap.set_free_bytes(40_000);
        coordinator.release_quiet(OperationKind::DisplayUpdate, "display");
        assert_eq!(coordinator.minimum_free_heap(), 12_000);
    }

    #[test]
    fn test_threshold_predicates() {
        let (heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        assert!(!coordinator.is_memory_low());
        assert!(!coordinator.is_memory_critical());

        heap.set_free_bytes(9_000);
        assert!(coordinator.is_memory_low());
        assert!(!coordinator.is_memory_critical());

        heap.set_free_bytes(4_000);
        assert!(coordinator.is_memory_low());
        assert!(coordinator.is_memory_critical());
    }

    #[test]
    fn test_status_snapshot() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        assert!(coordinator.request_quiet(
            OperationKind::HttpRequest,
            Priority::Important,
            2_500,
            "weather",
        ));

        let status = coordinator.status();
        assert_eq!(status.free_heap, 50_000);
        assert_eq!(status.active_operations, 1);
        assert_eq!(status.estimated_bytes_in_use, 2_500);
        assert_eq!(status.leases.len(), 1);
        assert_eq!(status.leases[0].owner, "weather");
        assert_eq!(status.leases[0].priority, Priority::Important);
    }

    #[test]
    fn test_cleanup_callbacks_fire_in_order() {
        let (_heap, coordinator) = coordinator_with(50_000, 10_000, 5_000);
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            coordinator.register_cleanup(name, move || {
                order.lock().push(name);
            });
        }

        coordinator.perform_global_cleanup();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }
}
