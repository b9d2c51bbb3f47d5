//! Session domain: remaining time derived from an absolute deadline.
//!
//! Nothing here counts ticks. Every read recomputes from `ends_at`, so a
//! stalled or skipped tick corrects itself on the next one.

use chrono::{DateTime, Utc};

/// Whole seconds until `ends_at`, floored and never negative.
pub fn seconds_left_at(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining_ms = (ends_at - now).num_milliseconds();
    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms / 1000) as u64
    }
}

pub fn seconds_left(ends_at: DateTime<Utc>) -> u64 {
    seconds_left_at(ends_at, Utc::now())
}

/// `mm:ss` with both fields zero-padded. Minutes are not wrapped into hours.
pub fn format_countdown(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
