//! SSE handler for session frames

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse,
    },
};
use tokio::sync::broadcast;
use tracing::debug;

use super::SseEvent;
use crate::api::state::AppState;
use crate::error::TimelineError;

/// GET /api/sessions/:sid/stream - SSE stream of scrub frames
///
/// Starts with the current frame, then forwards every published frame. The
/// stream ends when the session is unmounted.
pub async fn session_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, TimelineError> {
    let (mut frames, initial) = {
        let slot = state.sessions.get(&session_id)?;
        // frames are published under this lock, so nothing slips in between
        let session = slot.lock();
        (slot.subscribe(), session.frame())
    };
    debug!(session = %session_id, "frame stream opened");

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(SseEvent::Frame { frame: initial }.into_event());

        loop {
            match frames.recv().await {
                Ok(frame) => {
                    yield Ok(SseEvent::Frame { frame }.into_event());
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Client is too slow; the next frame carries the full state
                    let error = SseEvent::Error {
                        code: "lagged".to_string(),
                        message: format!("Missed {} frames", n),
                    };
                    yield Ok(error.into_event());
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session = %session_id, "frame stream closed");
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default().interval(Duration::from_secs(15))))
}
