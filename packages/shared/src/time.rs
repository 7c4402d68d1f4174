//! Time-related utilities with clock abstraction for testability.
//!
//! Timestamps are Unix epoch milliseconds (UTC) throughout the workspace.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to UTC RFC 3339 with millisecond precision.
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    to_utc(timestamp_millis).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a Unix timestamp (milliseconds) as local wall-clock time `HH:MM:SS`.
pub fn format_clock_time(timestamp_millis: i64) -> String {
    to_utc(timestamp_millis)
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

fn to_utc(timestamp_millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // Test: SystemClock never goes backwards between two calls
        // given (preconditions):
        let clock = SystemClock;

        // when (action):
        let timestamp1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let timestamp2 = clock.now_millis();

        // then (expected):
        assert!(timestamp1 > 0);
        assert!(timestamp2 >= timestamp1);
    }

    #[test]
    fn test_fixed_clock_returns_consistent_timestamp() {
        // Test: FixedClock returns the same timestamp on every call
        // given (preconditions):
        let fixed_time = 9876543210987;
        let clock = FixedClock::new(fixed_time);

        // when (action):
        let timestamp1 = clock.now_millis();
        let timestamp2 = clock.now_millis();

        // then (expected):
        assert_eq!(timestamp1, fixed_time);
        assert_eq!(timestamp2, fixed_time);
    }

    #[test]
    fn test_timestamp_to_rfc3339_with_milliseconds() {
        // Test: millisecond timestamps render as UTC RFC 3339
        // given (preconditions):
        // 2023-01-01 00:00:00.123 UTC
        let timestamp = 1672531200123;

        // when (action):
        let result = timestamp_to_rfc3339(timestamp);

        // then (expected):
        assert_eq!(result, "2023-01-01T00:00:00.123Z");
    }

    #[test]
    fn test_format_clock_time_shape() {
        // Test: wall-clock formatting yields HH:MM:SS
        // given (preconditions):
        let timestamp = 1672531200123;

        // when (action):
        let result = format_clock_time(timestamp);

        // then (expected):
        assert_eq!(result.len(), 8);
        assert_eq!(result.as_bytes()[2], b':');
        assert_eq!(result.as_bytes()[5], b':');
    }
}
