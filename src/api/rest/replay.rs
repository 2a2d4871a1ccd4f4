//! Stateless reconstruction endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, ApiResult};
use crate::api::state::AppState;
use crate::error::{TimelineError, TimelineResult};
use crate::replay::{compute_buffer, compute_buffer_checked, ReconstructionGap};
use crate::types::{ReplayWindow, TextBuffer};
use crate::utils::current_timestamp_ms;

/// Query parameters for buffer reconstruction
#[derive(Debug, Deserialize)]
pub struct BufferParams {
    pub end: Option<i64>,
    pub file: String,
    /// Events to replay; defaults to the whole window
    pub k: Option<usize>,
    /// Report the first range that did not fit
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub file_path: String,
    pub k: usize,
    pub total_events: usize,
    pub lines: TextBuffer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<ReconstructionGap>,
}

async fn load_window(state: &AppState, workspace_id: String, end: i64) -> TimelineResult<ReplayWindow> {
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || store.fetch_full_window(&workspace_id, end))
        .await
        .map_err(|e| TimelineError::Internal(format!("window fetch task failed: {}", e)))?
}

/// GET /api/workspaces/:id/buffer - File contents after the first `k` events
pub async fn get_buffer(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Query(params): Query<BufferParams>,
) -> ApiResult<BufferView> {
    let end = params.end.unwrap_or_else(current_timestamp_ms);
    let window = load_window(&state, workspace_id, end).await?;

    let total_events = window.len();
    let k = params.k.unwrap_or(total_events).min(total_events);

    let (lines, gap) = if params.checked {
        let reconstruction = compute_buffer_checked(&window, &params.file, k);
        let gap = reconstruction.gap();
        (reconstruction.into_lines(), gap)
    } else {
        (compute_buffer(&window, &params.file, k), None)
    };

    let view = BufferView {
        file_path: params.file,
        k,
        total_events,
        lines,
        gap,
    };
    Ok(Json(ApiResponse::new(view, state.current_sequence_id())))
}

/// Query parameters for the file list
#[derive(Debug, Deserialize)]
pub struct FilesParams {
    pub end: Option<i64>,
}

/// GET /api/workspaces/:id/files - File paths in first-edit order
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Query(params): Query<FilesParams>,
) -> ApiResult<Vec<String>> {
    let end = params.end.unwrap_or_else(current_timestamp_ms);
    let window = load_window(&state, workspace_id, end).await?;

    let files = window.file_paths();
    let total = files.len();
    Ok(Json(ApiResponse::with_total(files, state.current_sequence_id(), total)))
}
