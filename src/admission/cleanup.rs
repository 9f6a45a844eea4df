//! Cleanup-callback registry.
//!
//! Subsystems register a zero-argument callback at setup time. When an
//! admission request cannot be satisfied, the coordinator fans out to every
//! registered callback so each subsystem can voluntarily drop caches,
//! buffers, or other reclaimable memory it controls.

use std::sync::Arc;

/// A registered cleanup participant.
#[derive(Clone)]
pub(crate) struct CleanupEntry {
    pub owner: String,
    pub callback: Arc<dyn Fn() + Send + Sync>,
}

/// Fixed-capacity, append-only callback table.
///
/// Registration is capped at [`CleanupRegistry::MAX_CALLBACKS`]; entries
/// past the cap are silently dropped. The cap is a deliberate memory
/// ceiling, not a growth limit to be tuned away. Duplicate registrations by
/// the same owner are kept and all of them fire.
pub(crate) struct CleanupRegistry {
    entries: Vec<CleanupEntry>,
}

impl CleanupRegistry {
    /// Maximum number of registered callbacks.
    pub const MAX_CALLBACKS: usize = 10;

    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(Self::MAX_CALLBACKS),
        }
    }

    /// Append a callback. Returns `false` when the table is full or the
    /// owner name is empty.
    pub fn register(&mut self, owner: &str, callback: Arc<dyn Fn() + Send + Sync>) -> bool {
        if owner.is_empty() || self.entries.len() >= Self::MAX_CALLBACKS {
            return false;
        }
        self.entries.push(CleanupEntry {
            owner: owner.to_string(),
            callback,
        });
        true
    }

    /// Snapshot the current entries in registration order.
    ///
    /// The fan-out invokes the snapshot without holding the registry lock,
    /// so a callback is free to call back into the coordinator.
    pub fn snapshot(&self) -> Vec<CleanupEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
