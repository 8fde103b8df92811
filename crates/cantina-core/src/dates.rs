//! # Calendar-Date Helpers
//!
//! The ledger and workday history key on plain `YYYY-MM-DD` strings in the
//! cafeteria's local timezone (a "day" is the staff's day, not UTC's), with
//! `HH:MM:SS` wall-clock times alongside. Timestamps stored for ordering
//! (`created_at`, `opened_at`, ...) stay in UTC.

use chrono::{Duration, Local};

/// Today's calendar date, `YYYY-MM-DD`.
pub fn current_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Current wall-clock time, `HH:MM:SS`.
pub fn current_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// The calendar date `days` days ago, `YYYY-MM-DD`.
pub fn date_days_ago(days: i64) -> String {
    (Local::now() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Yesterday's calendar date, `YYYY-MM-DD`.
pub fn yesterday() -> String {
    date_days_ago(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format() {
        let date = current_date();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }

    #[test]
    fn test_time_format() {
        let time = current_time();
        assert_eq!(time.len(), 8);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn test_days_ago_ordering() {
        // Lexicographic comparison works on YYYY-MM-DD keys.
        assert!(date_days_ago(2) < date_days_ago(1) || date_days_ago(2) <= current_date());
        assert!(date_days_ago(0) == current_date());
    }
}
