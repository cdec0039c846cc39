//! Timestamp formatting for table output.

use chrono::{DateTime, Local};

/// Convert an API UTC timestamp to local time for display. Values that
/// fail to parse are shown as-is.
pub fn user_time(utc: &str) -> String {
    match DateTime::parse_from_rfc3339(utc) {
        Ok(timestamp) => timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => utc.to_string(),
    }
}
