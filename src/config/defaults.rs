//! Default values and constants for all configuration settings.

use super::settings::{ConfigFile, LoggerSettings, MemorySettings};
use crate::logger::Level;

/// Default low-memory threshold written to new config files.
///
/// Tighter than the coordinator's built-in default: a configured device
/// knows its real headroom.
pub const DEFAULT_LOW_THRESHOLD: usize = 10_000;

/// Default critical-memory threshold written to new config files.
pub const DEFAULT_CRITICAL_THRESHOLD: usize = 5_000;

/// Default bounded wait for denied admission requests, in seconds.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;

/// Durable-sink logging is opt-in.
pub const DEFAULT_FILE_LOGGING_ENABLED: bool = false;

/// Default minimum log level.
pub const DEFAULT_LOG_LEVEL: Level = Level::Info;

/// Default log filename prefix.
pub const DEFAULT_FILE_PREFIX: &str = "station";

/// Date-suffixed filenames by default, so files rotate daily.
pub const DEFAULT_INCLUDE_DATE_IN_FILENAME: bool = true;

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            file_logging_enabled: DEFAULT_FILE_LOGGING_ENABLED,
            log_level: DEFAULT_LOG_LEVEL,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            include_date_in_filename: DEFAULT_INCLUDE_DATE_IN_FILENAME,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            memory: MemorySettings::default(),
            logger: LoggerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = ConfigFile::default();
        assert!(config.memory.critical_threshold <= config.memory.low_threshold);
        assert!(!config.logger.file_logging_enabled);
        assert_eq!(config.logger.log_level, Level::Info);
        assert_eq!(config.logger.file_prefix, "station");
        assert!(config.logger.include_date_in_filename);
    }
}
