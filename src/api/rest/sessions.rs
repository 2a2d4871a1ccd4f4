//! Scrub session endpoints
//!
//! Each transition returns the resulting frame and also publishes it to the
//! session's SSE stream.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use super::{ApiResponse, ApiResult};
use crate::api::state::AppState;
use crate::error::TimelineError;
use crate::session::Frame;
use crate::utils::current_timestamp_ms;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub workspace_id: String,
    /// Window end; defaults to now
    pub end_timestamp: Option<i64>,
    /// Timestamps to pin as scrub markers
    #[serde(default)]
    pub markers: Vec<i64>,
}

/// POST /api/sessions - Mount a scrub session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Frame>>), TimelineError> {
    let end = request.end_timestamp.unwrap_or_else(current_timestamp_ms);
    let frame = state
        .sessions
        .create(&request.workspace_id, end, request.markers)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(frame, state.current_sequence_id())),
    ))
}

/// GET /api/sessions/:sid - Current frame
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Frame> {
    let frame = state.sessions.frame(&session_id)?;
    Ok(Json(ApiResponse::new(frame, state.current_sequence_id())))
}

/// DELETE /api/sessions/:sid - Unmount
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, TimelineError> {
    state.sessions.close(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pointer position on the 0–100 scale
#[derive(Debug, Deserialize)]
pub struct ScrubRequest {
    pub value: f64,
}

fn respond(state: &AppState, frame: Frame) -> ApiResult<Frame> {
    debug!(
        session = %frame.session_id,
        value = frame.state.value,
        k = frame.k,
        "scrub transition"
    );
    Ok(Json(ApiResponse::new(frame, state.current_sequence_id())))
}

/// POST /api/sessions/:sid/drag-start
pub async fn drag_start(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ScrubRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.drag_start(&session_id, request.value)?;
    respond(&state, frame)
}

/// POST /api/sessions/:sid/drag-move
pub async fn drag_move(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ScrubRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.drag_move(&session_id, request.value)?;
    respond(&state, frame)
}

/// POST /api/sessions/:sid/drag-end
pub async fn drag_end(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ScrubRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.drag_end(&session_id, request.value)?;
    respond(&state, frame)
}

/// POST /api/sessions/:sid/seek - Jump without drag semantics
pub async fn seek(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ScrubRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.seek(&session_id, request.value)?;
    respond(&state, frame)
}

#[derive(Debug, Deserialize)]
pub struct AutoplayRequest {
    pub enabled: bool,
}

/// POST /api/sessions/:sid/autoplay
pub async fn set_autoplay(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<AutoplayRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.set_autoplay(&session_id, request.enabled)?;
    respond(&state, frame)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFileRequest {
    pub file_path: String,
}

/// POST /api/sessions/:sid/file - Switch the designated file
pub async fn select_file(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectFileRequest>,
) -> ApiResult<Frame> {
    let frame = state.sessions.set_file(&session_id, &request.file_path).await?;
    respond(&state, frame)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEndRequest {
    pub end_timestamp: i64,
}

/// POST /api/sessions/:sid/end - Move the window end and refetch
pub async fn set_end(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<SetEndRequest>,
) -> ApiResult<Frame> {
    let frame = state
        .sessions
        .set_end_timestamp(&session_id, request.end_timestamp)
        .await?;
    respond(&state, frame)
}
