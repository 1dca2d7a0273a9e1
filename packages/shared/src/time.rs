//! Time utilities with a clock abstraction for testability.
//!
//! All timestamps are Unix epoch milliseconds (UTC). Human readable labels
//! are rendered at a caller supplied UTC offset.

use chrono::{FixedOffset, Offset, TimeZone, Utc};

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
        current_timestamp_millis()
    }
}

/// Get current Unix timestamp in milliseconds
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn offset_for(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours.clamp(-23, 23) * 3600)
        .unwrap_or_else(|| Utc.fix())
}

/// Render a timestamp as a wall clock label (`HH:MM`) at the given UTC offset.
///
/// Out-of-range timestamps render as `--:--`.
pub fn format_clock_label(timestamp_millis: i64, utc_offset_hours: i32) -> String {
    match offset_for(utc_offset_hours).timestamp_millis_opt(timestamp_millis) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        _ => "--:--".to_string(),
    }
}

/// Convert a Unix timestamp (milliseconds) to RFC 3339 at the given UTC offset.
pub fn timestamp_to_rfc3339(timestamp_millis: i64, utc_offset_hours: i32) -> String {
    match offset_for(utc_offset_hours).timestamp_millis_opt(timestamp_millis) {
        chrono::LocalResult::Single(dt) => dt.to_rfc3339(),
        _ => String::new(),
    }
}
