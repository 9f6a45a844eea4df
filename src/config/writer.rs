//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let file_logging_enabled = bool_str(config.logger.file_logging_enabled);
    let include_date = bool_str(config.logger.include_date_in_filename);

    format!(
        r"[memory]
; Free-heap level (bytes) below which memory is considered low.
low_threshold = {}
; Free-heap level (bytes) below which memory is considered critical.
; Must not exceed low_threshold.
critical_threshold = {}
; Seconds a denied memory request waits for heap to come back.
wait_timeout_secs = {}

[logger]
; Write log entries to a file in addition to the console (true/false).
file_logging_enabled = {}
; Minimum level kept: DEBUG, INFO, WARNING, or ERROR.
log_level = {}
; Log filename prefix; the file is /<prefix>.log.
file_prefix = {}
; Append the local date so a new file starts each day (true/false).
include_date_in_filename = {}
",
        config.memory.low_threshold,
        config.memory.critical_threshold,
        config.memory.wait_timeout_secs,
        file_logging_enabled,
        config.logger.log_level,
        config.logger.file_prefix,
        include_date,
    )
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_ini;
    use super::*;
    use crate::logger::Level;
    use ini::Ini;

    #[test]
    fn test_default_round_trip() {
        let original = ConfigFile::default();
        let content = to_config_string(&original);

        let ini = Ini::load_from_str(&content).unwrap();
        let parsed = parse_ini(&ini).unwrap();

        assert_eq!(parsed.memory.low_threshold, original.memory.low_threshold);
        assert_eq!(
            parsed.memory.critical_threshold,
            original.memory.critical_threshold
        );
        assert_eq!(parsed.logger.log_level, original.logger.log_level);
        assert_eq!(parsed.logger.file_prefix, original.logger.file_prefix);
    }

    #[test]
    fn test_modified_values_round_trip() {
        let mut config = ConfigFile::default();
        config.memory.low_threshold = 24_000;
        config.logger.file_logging_enabled = true;
        config.logger.log_level = Level::Error;
        config.logger.file_prefix = "unit-7".to_string();

        let ini = Ini::load_from_str(&to_config_string(&config)).unwrap();
        let parsed = parse_ini(&ini).unwrap();

        assert_eq!(parsed.memory.low_threshold, 24_000);
        assert!(parsed.logger.file_logging_enabled);
        assert_eq!(parsed.logger.log_level, Level::Error);
        assert_eq!(parsed.logger.file_prefix, "unit-7");
    }
}
