//! Error type shared by the store, replay sessions and the HTTP layer

use thiserror::Error;

/// Result type for timeline operations
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors that can occur while recording or replaying a timeline
///
/// Malformed events and reconstruction gaps are deliberately absent here:
/// both are recovered locally and never abort a window fetch or a replay.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session closed: {0}")]
    SessionClosed(String),

    #[error("stale fetch discarded (generation {ticket}, current {current})")]
    StaleFetch { ticket: u64, current: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl TimelineError {
    /// Machine-readable code for API error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            TimelineError::Io(_) => "IO_ERROR",
            TimelineError::Json(_) => "INTERNAL_ERROR",
            TimelineError::InvalidRecord(_) => "BAD_REQUEST",
            TimelineError::InvalidCursor(_) => "INVALID_CURSOR",
            TimelineError::SessionNotFound(_) => "NOT_FOUND",
            TimelineError::SessionClosed(_) => "GONE",
            TimelineError::StaleFetch { .. } => "STALE_FETCH",
            TimelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is caused by the caller rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TimelineError::InvalidRecord(_)
                | TimelineError::InvalidCursor(_)
                | TimelineError::SessionNotFound(_)
                | TimelineError::SessionClosed(_)
                | TimelineError::StaleFetch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_server_side() {
        let err: TimelineError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("disk"));
    }

    #[test]
    fn test_cursor_error_is_client_side() {
        let err = TimelineError::InvalidCursor("zz".to_string());
        assert_eq!(err.error_code(), "INVALID_CURSOR");
        assert!(err.is_client_error());
    }
}
