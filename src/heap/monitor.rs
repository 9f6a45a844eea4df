//! Free-heap monitoring trait and implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Delay between the two introspection calls of a [`HeapMonitor::nudge`].
const NUDGE_SETTLE: Duration = Duration::from_millis(10);

/// Source of "free heap right now" readings.
///
/// Implementations must be `Send + Sync`; the coordinator and the log
/// pipeline share one monitor across all tasks via `Arc<dyn HeapMonitor>`.
///
/// Readings are advisory. The admission layer compares them against
/// configured thresholds; it never partitions or owns the heap itself.
pub trait HeapMonitor: Send + Sync {
    /// Returns the current free heap in bytes.
    fn free_bytes(&self) -> usize;

    /// Best-effort hint to the allocator that now is a good moment to
    /// compact or return freed memory.
    ///
    /// There is no portable way to force compaction; the default
    /// implementation performs two free-heap queries separated by a short
    /// delay, which on some allocators coalesces free blocks as a side
    /// effect of introspection. Implementations with a real reclaim
    /// primitive may override this.
    fn nudge(&self) {
        let _ = self.free_bytes();
        thread::sleep(NUDGE_SETTLE);
        let _ = self.free_bytes();
    }
}

/// Production heap monitor backed by the operating system.
///
/// # Platform Support
///
/// - **Linux**: parses `MemAvailable` from `/proc/meminfo`
/// - **Other platforms**: returns a permissive fallback so admission is
///   never spuriously denied on hosts we cannot measure
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHeapMonitor;

impl SystemHeapMonitor {
    /// Create a new system heap monitor.
    pub fn new() -> Self {
        Self
    }
}

impl HeapMonitor for SystemHeapMonitor {
    fn free_bytes(&self) -> usize {
        detect_available_memory()
    }
}

/// Detect available system memory in bytes.
#[cfg(target_os = "linux")]
fn detect_available_memory() -> usize {
    use std::fs;

    if let Ok(content) = fs::read_to_string("/proc/meminfo") {
        for line in content.lines() {
            if line.starts_with("MemAvailable:") {
                // Format: "MemAvailable:    1234567 kB"
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    if let Ok(kb) = parts[1].parse::<usize>() {
                        return kb * 1024;
                    }
                }
            }
        }
    }

    fallback_memory()
}

#[cfg(not(target_os = "linux"))]
fn detect_available_memory() -> usize {
    fallback_memory()
}

/// Fallback when available memory cannot be measured.
const fn fallback_memory() -> usize {
    8 * 1024 * 1024 * 1024 // 8GB
}

/// A heap monitor with an externally controlled reading.
///
/// Used by tests to drive the coordinator through exact pressure scenarios,
/// and by embedding hosts that account for their own heap budget rather
/// than trusting OS-level numbers.
///
/// # Example
///
/// ```
/// use heapwarden::heap::{HeapMonitor, SimulatedHeap};
///
/// let heap = SimulatedHeap::new(32_000);
/// assert_eq!(heap.free_bytes(), 32_000);
///
/// heap.consume(12_000);
/// assert_eq!(heap.free_bytes(), 20_000);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedHeap {
    free: AtomicUsize,
}

impl SimulatedHeap {
    /// Create a simulated heap with the given free byte count.
    pub fn new(free_bytes: usize) -> Self {
        Self {
            free: AtomicUsize::new(free_bytes),
        }
    }

    /// Set the free-heap reading to an exact value.
    pub fn set_free_bytes(&self, free_bytes: usize) {
        self.free.store(free_bytes, Ordering::Release);
    }

    /// Reduce the free-heap reading, saturating at zero.
    pub fn consume(&self, bytes: usize) {
        let mut current = self.free.load(Ordering::Acquire);
        loop {
            let next = current.saturating_sub(bytes);
            match self.free.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(c) => current = c,
            }
        }
    }

    /// Increase the free-heap reading.
    pub fn reclaim(&self, bytes: usize) {
        self.free.fetch_add(bytes, Ordering::AcqRel);
    }
}

impl HeapMonitor for SimulatedHeap {
    fn free_bytes(&self) -> usize {
        self.free.load(Ordering::Acquire)
    }

    fn nudge(&self) {
        // A simulated heap has nothing to compact.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_monitor_returns_positive() {
        let monitor = SystemHeapMonitor::new();
        assert!(monitor.free_bytes() > 0, "Should report some free memory");
    }

    #[test]
    fn test_simulated_heap_reads_back() {
        let heap = SimulatedHeap::new(10_000);
        assert_eq!(heap.free_bytes(), 10_000);

        heap.set_free_bytes(4_096);
        assert_eq!(heap.free_bytes(), 4_096);
    }

    #[test]
    fn test_simulated_heap_consume_saturates() {
        let heap = SimulatedHeap::new(1_000);
        heap.consume(5_000);
        assert_eq!(heap.free_bytes(), 0);
    }

    #[test]
    fn test_simulated_heap_reclaim() {
        let heap = SimulatedHeap::new(1_000);
        heap.reclaim(500);
        assert_eq!(heap.free_bytes(), 1_500);
    }

    #[test]
    fn test_nudge_does_not_change_reading() {
        let heap = SimulatedHeap::new(2_048);
        heap.nudge();
        assert_eq!(heap.free_bytes(), 2_048);
    }

    #[test]
    fn test_monitor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemHeapMonitor>();
        assert_send_sync::<SimulatedHeap>();
    }
}
