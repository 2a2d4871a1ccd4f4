//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{events, replay, sessions};
use super::sse::handler::session_stream;
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Event log
        .route("/api/events", post(events::ingest_events))
        .route("/api/workspaces", get(events::list_workspaces))
        .route("/api/workspaces/:id/events", get(events::list_window))
        .route("/api/workspaces/:id/bounds", get(events::get_bounds))
        .route("/api/workspaces/:id/buffer", get(replay::get_buffer))
        .route("/api/workspaces/:id/files", get(replay::list_files))
        .route("/api/debug/events", get(events::list_grouped))
        .route("/api/stats", get(events::get_stats))
        // Scrub sessions
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:sid",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/:sid/drag-start", post(sessions::drag_start))
        .route("/api/sessions/:sid/drag-move", post(sessions::drag_move))
        .route("/api/sessions/:sid/drag-end", post(sessions::drag_end))
        .route("/api/sessions/:sid/seek", post(sessions::seek))
        .route("/api/sessions/:sid/autoplay", post(sessions::set_autoplay))
        .route("/api/sessions/:sid/file", post(sessions::select_file))
        .route("/api/sessions/:sid/end", post(sessions::set_end))
        .route("/api/sessions/:sid/stream", get(session_stream))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStore;
    use crate::session::SessionConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let store = Arc::new(EventStore::in_memory());
        let state = Arc::new(AppState::new(store, SessionConfig::default()));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }
}
