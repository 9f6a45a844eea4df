//! Durable-sink filename construction.
//!
//! Filenames are deterministic so that rotation happens purely through the
//! date suffix changing at each local-day boundary; the pipeline itself
//! never truncates or rotates an open file.

use crate::clock::Clock;
use std::path::PathBuf;

/// Milliseconds per day, for the boot-relative fallback suffix.
const MILLIS_PER_DAY: u64 = 86_400_000;

/// Build a log-file path from a prefix.
///
/// - without a date: `/{prefix}.log`
/// - with a date and a synchronized clock: `/{prefix}_YYYYMMDD.log`
/// - with a date but no wall clock yet: `/{prefix}_{days-since-boot}.log`,
///   which stays unique per day and meaningful instead of failing
///
/// # Example
///
/// ```
/// use heapwarden::clock::ManualClock;
/// use heapwarden::logger::generate_log_filename;
/// use std::path::PathBuf;
///
/// let clock = ManualClock::new();
/// let path = generate_log_filename("station", false, &clock);
/// assert_eq!(path, PathBuf::from("/station.log"));
/// ```
pub fn generate_log_filename(prefix: &str, include_date: bool, clock: &dyn Clock) -> PathBuf {
    let mut name = format!("/{prefix}");

    if include_date {
        match clock.wall_time() {
            Some(time) => name.push_str(&time.format("_%Y%m%d").to_string()),
            None => {
                let days = clock.millis_since_boot() / MILLIS_PER_DAY;
                name.push_str(&format!("_{days}"));
            }
        }
    }

    name.push_str(".log");
    PathBuf::from(name)
}
