//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to
//! struct fields. Parsing starts from `ConfigFile::default()` and overlays
//! any values found in the INI; unknown sections and keys are ignored.

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::logger::Level;

/// Parse an `Ini` object into a `ConfigFile`.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [memory] section
    if let Some(section) = ini.section(Some("memory")) {
        if let Some(v) = section.get("low_threshold") {
            config.memory.low_threshold =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "memory".to_string(),
                    key: "low_threshold".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (bytes)".to_string(),
                })?;
        }
        if let Some(v) = section.get("critical_threshold") {
            config.memory.critical_threshold =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "memory".to_string(),
                    key: "critical_threshold".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (bytes)".to_string(),
                })?;
        }
        if let Some(v) = section.get("wait_timeout_secs") {
            config.memory.wait_timeout_secs =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "memory".to_string(),
                    key: "wait_timeout_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }

        if config.memory.critical_threshold > config.memory.low_threshold {
            return Err(ConfigFileError::InvalidValue {
                section: "memory".to_string(),
                key: "critical_threshold".to_string(),
                value: config.memory.critical_threshold.to_string(),
                reason: "must not exceed low_threshold".to_string(),
            });
        }
    }

    // [logger] section
    if let Some(section) = ini.section(Some("logger")) {
        if let Some(v) = section.get("file_logging_enabled") {
            config.logger.file_logging_enabled = parse_bool(v);
        }
        if let Some(v) = section.get("log_level") {
            config.logger.log_level =
                v.parse::<Level>()
                    .map_err(|_| ConfigFileError::InvalidValue {
                        section: "logger".to_string(),
                        key: "log_level".to_string(),
                        value: v.to_string(),
                        reason: "must be one of: DEBUG, INFO, WARNING, ERROR".to_string(),
                    })?;
        }
        if let Some(v) = section.get("file_prefix") {
            let v = v.trim();
            if !v.is_empty() {
                config.logger.file_prefix = v.to_string();
            }
        }
        if let Some(v) = section.get("include_date_in_filename") {
            config.logger.include_date_in_filename = parse_bool(v);
        }
    }

    Ok(config)
}

/// Boolean parsing: `true`/`1` are true, everything else is false.
fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
