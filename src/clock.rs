//! Timestamps and calendar helpers.
//!
//! All persisted timestamps are milliseconds since the Unix epoch.

use chrono::{Datelike, Local, LocalResult, TimeZone, Utc};

/// Current wall-clock time in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Next `updatedAt` value: wall clock, but never at or before the previous one.
pub(crate) fn next_update_stamp(previous: i64) -> i64 {
    now_millis().max(previous + 1)
}

/// Midnight on January 1st of the local year containing `timestamp_ms`.
pub fn start_of_year_millis(timestamp_ms: i64) -> i64 {
    let year = match Local.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.year(),
        LocalResult::None => Utc::now().year(),
    };
    match Local.with_ymd_and_hms(year, 1, 1, 0, 0, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
        // No local midnight that day (DST jump); fall back to UTC midnight
        LocalResult::None => Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0),
    }
}

/// `dd/MM/yyyy` in the device's local time zone.
pub fn format_local_date(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format("%d/%m/%Y").to_string()
        }
        LocalResult::None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_stamp_is_strictly_increasing() {
        let far_future = now_millis() + 60_000;
        assert_eq!(next_update_stamp(far_future), far_future + 1);
        assert!(next_update_stamp(0) > 0);
    }

    #[test]
    fn test_start_of_year() {
        let now = now_millis();
        let start = start_of_year_millis(now);
        assert!(start <= now);
        assert!(now - start <= 367 * 24 * 60 * 60 * 1000);
        assert_eq!(start_of_year_millis(start), start);
    }

    #[test]
    fn test_format_local_date_shape() {
        let formatted = format_local_date(now_millis());
        assert_eq!(formatted.len(), 10);
        assert_eq!(&formatted[2..3], "/");
        assert_eq!(&formatted[5..6], "/");
    }
}
