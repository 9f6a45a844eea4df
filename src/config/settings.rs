//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. These
//! are pure data types; parsing lives in [`super::parser`], serialization
//! in [`super::writer`], and defaults in [`super::defaults`].

use crate::admission::CoordinatorConfig;
use crate::logger::Level;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Memory admission settings
    pub memory: MemorySettings,
    /// Logger settings
    pub logger: LoggerSettings,
}

/// Memory admission configuration.
#[derive(Debug, Clone)]
pub struct MemorySettings {
    /// Free-heap level below which memory is considered low, in bytes.
    pub low_threshold: usize,
    /// Free-heap level below which memory is considered critical, in bytes.
    /// Must not exceed `low_threshold`.
    pub critical_threshold: usize,
    /// Seconds a denied request waits for memory before giving up.
    pub wait_timeout_secs: u64,
}

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerSettings {
    /// Enable the durable (file) sink.
    pub file_logging_enabled: bool,
    /// Minimum accepted level: DEBUG, INFO, WARNING, or ERROR.
    pub log_level: Level,
    /// Log filename prefix.
    pub file_prefix: String,
    /// Append the local date to the filename so a new file starts at each
    /// day boundary.
    pub include_date_in_filename: bool,
}

impl From<&MemorySettings> for CoordinatorConfig {
    fn from(settings: &MemorySettings) -> Self {
        CoordinatorConfig::with_thresholds(settings.low_threshold, settings.critical_threshold)
            .with_wait_timeout(Duration::from_secs(settings.wait_timeout_secs))
    }
}
