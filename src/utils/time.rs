//! Time and timestamp utilities

use chrono::{TimeZone, Utc};

/// Current Unix time in milliseconds, the unit of event timestamps
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 3339 rendering of a millisecond timestamp, for logs and debug output
pub fn format_timestamp_ms(timestamp: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp)
        .single()
        .map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_is_milliseconds() {
        // after 2020-01-01 and before 2200-01-01
        let now = current_timestamp_ms();
        assert!(now > 1_577_836_800_000);
        assert!(now < 7_258_118_400_000);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp_ms(0).as_deref(),
            Some("1970-01-01T00:00:00+00:00")
        );
        assert_eq!(format_timestamp_ms(i64::MAX), None);
    }
}
