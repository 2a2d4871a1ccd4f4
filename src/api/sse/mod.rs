//! SSE (Server-Sent Events) module for scrub frames
//!
//! ## Endpoints
//! - `GET /api/sessions/:sid/stream` - frames of one session as they change

pub mod handler;

use axum::response::sse::Event;
use serde::Serialize;

use crate::session::Frame;

/// SSE event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    /// New scrub frame
    Frame {
        #[serde(flatten)]
        frame: Frame,
    },
    /// Error notification
    Error { code: String, message: String },
}

impl SseEvent {
    fn name(&self) -> &'static str {
        match self {
            SseEvent::Frame { .. } => "frame",
            SseEvent::Error { .. } => "error",
        }
    }

    pub fn into_event(self) -> Event {
        Event::default()
            .event(self.name())
            .data(serde_json::to_string(&self).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_shape() {
        let event = SseEvent::Error {
            code: "lagged".to_string(),
            message: "missed 3 frames".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "lagged");
        assert_eq!(event.name(), "error");
    }
}
