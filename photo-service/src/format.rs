//! Display helpers for photo timestamps (rendered in UTC)

use chrono::{DateTime, Utc};

fn to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    if timestamp == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(timestamp)
}

/// e.g. "Jan 1, 2023"
pub fn format_date(timestamp: i64) -> String {
    match to_datetime(timestamp) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// e.g. "03:45 PM"
pub fn format_time(timestamp: i64) -> String {
    match to_datetime(timestamp) {
        Some(dt) => dt.format("%I:%M %p").to_string(),
        None => "N/A".to_string(),
    }
}

/// e.g. "Jan 1, 2023 at 03:45 PM"
pub fn format_date_time(timestamp: i64) -> String {
    if to_datetime(timestamp).is_none() {
        return "N/A".to_string();
    }
    format!("{} at {}", format_date(timestamp), format_time(timestamp))
}
