//! Shared peripheral-bus arbitration.
//!
//! Storage and display hardware sit on the same physical bus, so every
//! driver that touches it serializes through one shared [`StorageBus`].
//! Acquisition is always timeout-bounded: the normal budget covers short
//! transfers, and an extended budget exists for batch writes (log flushes)
//! that hold the bus longer.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;

/// Normal bus acquisition budget.
const BUS_TIMEOUT: Duration = Duration::from_secs(1);

/// Extended budget for batch transfers.
const BUS_BATCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle to the shared hardware bus.
///
/// Clones share the same underlying lock, so every peripheral driver can
/// hold its own handle.
///
/// # Example
///
/// ```
/// use heapwarden::bus::StorageBus;
///
/// let bus = StorageBus::new();
/// if let Some(_guard) = bus.acquire() {
///     // exclusive bus access until the guard drops
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct StorageBus {
    inner: Arc<Mutex<()>>,
}

impl StorageBus {
    /// Create a new bus handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the bus within the normal budget.
    ///
    /// Returns `None` on timeout; callers degrade (skip the transfer)
    /// rather than wait longer.
    pub fn acquire(&self) -> Option<BusGuard<'_>> {
        self.inner.try_lock_for(BUS_TIMEOUT).map(BusGuard)
    }

    /// Acquire the bus with the extended batch budget.
    pub fn acquire_batch(&self) -> Option<BusGuard<'_>> {
        self.inner.try_lock_for(BUS_BATCH_TIMEOUT).map(BusGuard)
    }
}

/// Exclusive bus access; released on drop.
pub struct BusGuard<'a>(#[allow(dead_code)] MutexGuard<'a, ()>);

impl std::fmt::Debug for BusGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusGuard").finish()
    }
}
