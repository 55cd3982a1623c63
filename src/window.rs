//! Sliding time-window aggregation (module B).

use chrono::{DateTime, Duration, Utc};

/// Largest number of timestamps, from a sorted slice, that fit inside any
/// window of the given duration. Window bounds are inclusive on both ends.
///
/// `timestamps` must already be sorted ascending; the two-pointer sweep below
/// relies on it.
pub fn max_in_window(timestamps: &[DateTime<Utc>], window: Duration) -> usize {
    if timestamps.is_empty() {
        return 0;
    }
    let mut max_count = 0usize;
    let mut left = 0usize;
    for right in 0..timestamps.len() {
        while timestamps[right] - timestamps[left] > window {
            left += 1;
        }
        max_count = max_count.max(right - left + 1);
    }
    max_count
}
