//! Integration tests for the memory admission coordinator.
//!
//! These tests verify the complete admission workflow including:
//! - Concurrent request/release from many threads
//! - Cooperative cleanup recovering a denied request
//! - Quiet-path latency guarantees under pressure
//! - Configuration-file wiring into the coordinator

use heapwarden::admission::{
    CoordinatorConfig, MemoryCoordinator, OperationKind, Priority, MAX_ACTIVE_OPERATIONS,
};
use heapwarden::config::ConfigFile;
use heapwarden::heap::{HeapMonitor, SimulatedHeap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// =============================================================================
// Test Helpers
// =============================================================================

fn coordinator(heap: Arc<SimulatedHeap>, low: usize, critical: usize) -> Arc<MemoryCoordinator> {
    Arc::new(MemoryCoordinator::new(
        heap as Arc<dyn HeapMonitor>,
        CoordinatorConfig::with_thresholds(low, critical)
            .with_wait_timeout(Duration::from_millis(50)),
    ))
}

// =============================================================================
// Integration Tests
// =============================================================================

#[test]
fn concurrent_lifecycles_return_to_baseline() {
    let heap = Arc::new(SimulatedHeap::new(1_000_000));
    let coordinator = coordinator(heap, 10_000, 5_000);

    let granted = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for worker in 0..8 {
        let coordinator = Arc::clone(&coordinator);
        let granted = Arc::clone(&granted);
        handles.push(thread::spawn(move || {
            let owner = format!("worker-{worker}");
            for _ in 0..25 {
                if coordinator.request_quiet(
                    OperationKind::DataProcessing,
                    Priority::Normal,
                    2_048,
                    &owner,
                ) {
                    granted.fetch_add(1, Ordering::SeqCst);
                    assert!(coordinator.active_operations() <= MAX_ACTIVE_OPERATIONS);
                    coordinator.release_quiet(OperationKind::DataProcessing, &owner);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Plenty of heap and at most 8 concurrent owners: every request fits.
    assert_eq!(granted.load(Ordering::SeqCst), 8 * 25);
    assert_eq!(coordinator.active_operations(), 0);
    assert_eq!(coordinator.estimated_bytes_in_use(), 0);
}

#[test]
fn cleanup_callback_rescues_denied_request() {
    let heap = Arc::new(SimulatedHeap::new(6_000));
    let coordinator = coordinator(Arc::clone(&heap), 10_000, 5_000);

    let cleanup_runs = Arc::new(AtomicUsize::new(0));
    {
        let heap = Arc::clone(&heap);
        let cleanup_runs = Arc::clone(&cleanup_runs);
        coordinator.register_cleanup("tile-cache", move || {
            cleanup_runs.fetch_add(1, Ordering::SeqCst);
            heap.reclaim(30_000);
        });
    }

    // 4096 + 10000 reserve > 6000 free: denied, cleanup fires, retry wins.
    assert!(coordinator.request(OperationKind::JsonParsing, Priority::Normal, 4_096, "weather"));
    assert_eq!(cleanup_runs.load(Ordering::SeqCst), 1);

    coordinator.release(OperationKind::JsonParsing, "weather");
    assert_eq!(coordinator.active_operations(), 0);
}

#[test]
fn quiet_requests_stay_fast_under_pressure() {
    let heap = Arc::new(SimulatedHeap::new(3_000));
    let coordinator = coordinator(heap, 10_000, 5_000);
    coordinator.register_cleanup("should-not-fire", || {
        panic!("quiet requests must never trigger cleanup");
    });

    let started = Instant::now();
    for _ in 0..50 {
        assert!(!coordinator.request_quiet(
            OperationKind::DisplayUpdate,
            Priority::Normal,
            1_024,
            "display",
        ));
    }
    // Fifty denials without a single cleanup pass or poll cycle.
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn priority_tiers_diverge_under_pressure() {
    let heap = Arc::new(SimulatedHeap::new(8_000));
    let coordinator = coordinator(heap, 10_000, 5_000);

    // At 8000 free with a 3000-byte estimate, only the critical tier
    // (reserve 2500) clears the bar.
    assert!(!coordinator.request_quiet(
        OperationKind::DataProcessing,
        Priority::Background,
        3_000,
        "prefetch",
    ));
    assert!(!coordinator.request_quiet(
        OperationKind::DataProcessing,
        Priority::Normal,
        3_000,
        "parser",
    ));
    assert!(!coordinator.request_quiet(
        OperationKind::DataProcessing,
        Priority::Important,
        3_000,
        "display",
    ));
    assert!(coordinator.request_quiet(
        OperationKind::ConfigOperation,
        Priority::Critical,
        3_000,
        "wifi",
    ));

    coordinator.release_quiet(OperationKind::ConfigOperation, "wifi");
}

#[test]
fn watermark_survives_recovery() {
    let heap = Arc::new(SimulatedHeap::new(40_000));
    let coordinator = coordinator(Arc::clone(&heap), 10_000, 5_000);

    heap.set_free_bytes(7_500);
    assert!(coordinator.request_quiet(
        OperationKind::ConfigOperation,
        Priority::Critical,
        1_000,
        "config",
    ));
    coordinator.release_quiet(OperationKind::ConfigOperation, "config");

    heap.set_free_bytes(40_000);
    let status = coordinator.status();
    assert_eq!(status.minimum_free_heap, 7_500);
    assert_eq!(status.free_heap, 40_000);
    assert_eq!(status.active_operations, 0);
}

#[test]
fn config_file_drives_coordinator_thresholds() {
    let content = "\
[memory]
low_threshold = 16000
critical_threshold = 8000
wait_timeout_secs = 1
";
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.ini");
    std::fs::write(&path, content).unwrap();

    let config = ConfigFile::load_from(&path).unwrap();
    let heap = Arc::new(SimulatedHeap::new(12_000));
    let coordinator = MemoryCoordinator::new(
        heap as Arc<dyn HeapMonitor>,
        CoordinatorConfig::from(&config.memory),
    );

    // 12000 free against the configured 16000 low threshold.
    assert!(coordinator.is_memory_low());
    assert!(!coordinator.is_memory_critical());

    // Critical reserve is 8000 / 2 = 4000: a 2000-byte critical request
    // fits, a normal one (reserve 16000) does not.
    assert!(!coordinator.request_quiet(
        OperationKind::DataProcessing,
        Priority::Normal,
        2_000,
        "parser",
    ));
    assert!(coordinator.request_quiet(
        OperationKind::ConfigOperation,
        Priority::Critical,
        2_000,
        "config",
    ));
}
