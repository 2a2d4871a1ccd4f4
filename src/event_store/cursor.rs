//! Page cursors
//!
//! A cursor is the `(timestamp, sequence)` key of the last record a page
//! scanned, written as `"{timestamp}:{sequence}"`. Clients treat it as opaque.

use crate::error::{TimelineError, TimelineResult};

use super::store::EventKey;

pub(crate) fn encode_cursor(key: EventKey) -> String {
    format!("{}:{}", key.timestamp, key.sequence)
}

pub(crate) fn decode_cursor(cursor: &str) -> TimelineResult<EventKey> {
    let invalid = || TimelineError::InvalidCursor(cursor.to_string());

    let (timestamp, sequence) = cursor.split_once(':').ok_or_else(invalid)?;
    Ok(EventKey {
        timestamp: timestamp.parse().map_err(|_| invalid())?,
        sequence: sequence.parse().map_err(|_| invalid())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_format() {
        let key = EventKey {
            timestamp: -15,
            sequence: 42,
        };
        assert_eq!(encode_cursor(key), "-15:42");
        assert_eq!(decode_cursor("-15:42").unwrap(), key);
    }

    #[test]
    fn test_malformed_cursors() {
        for bad in ["", "12", "a:1", "1:b", "1:-2", "1:2:3"] {
            assert!(
                matches!(decode_cursor(bad), Err(TimelineError::InvalidCursor(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
