//! Coordinator configuration.

use std::time::Duration;

/// Thresholds and timing knobs for the admission coordinator.
///
/// The two thresholds partition heap state into normal / low / critical
/// bands; the priority reserves in [`crate::admission::Priority`] are
/// derived from them. The defaults match a device with a few hundred
/// kilobytes of heap; embedding applications typically tighten them at
/// startup (e.g. 10000/5000) once real headroom is known.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Free-heap level below which memory is considered low.
    pub low_threshold: usize,
    /// Free-heap level below which memory is considered critical.
    /// Must not exceed `low_threshold` or the priority reserve ordering
    /// breaks down.
    pub critical_threshold: usize,
    /// Total time a denied (non-quiet) request will wait for memory to
    /// come back before giving up.
    pub wait_timeout: Duration,
}

impl CoordinatorConfig {
    /// Extra reserve demanded from background-priority requests on top of
    /// the low threshold.
    pub const BACKGROUND_MARGIN: usize = 10_000;

    /// Default low-memory threshold in bytes.
    pub const DEFAULT_LOW_THRESHOLD: usize = 20_000;

    /// Default critical-memory threshold in bytes.
    pub const DEFAULT_CRITICAL_THRESHOLD: usize = 10_000;

    /// Default bounded wait for a denied request.
    pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration with explicit thresholds and the default
    /// wait timeout.
    pub fn with_thresholds(low_threshold: usize, critical_threshold: usize) -> Self {
        Self {
            low_threshold,
            critical_threshold,
            ..Self::default()
        }
    }

    /// Replace the bounded wait applied when a request is denied.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            low_threshold: Self::DEFAULT_LOW_THRESHOLD,
            critical_threshold: Self::DEFAULT_CRITICAL_THRESHOLD,
            wait_timeout: Self::DEFAULT_WAIT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.low_threshold, 20_000);
        assert_eq!(config.critical_threshold, 10_000);
        assert_eq!(config.wait_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_thresholds() {
        let config = CoordinatorConfig::with_thresholds(10_000, 5_000);
        assert_eq!(config.low_threshold, 10_000);
        assert_eq!(config.critical_threshold, 5_000);
        assert_eq!(config.wait_timeout, CoordinatorConfig::DEFAULT_WAIT_TIMEOUT);
    }

    #[test]
    fn test_with_wait_timeout() {
        let config =
            CoordinatorConfig::default().with_wait_timeout(Duration::from_millis(50));
        assert_eq!(config.wait_timeout, Duration::from_millis(50));
    }
}
