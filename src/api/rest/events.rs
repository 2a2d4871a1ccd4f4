//! Event log endpoints

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ApiResponse, ApiResult};
use crate::api::state::AppState;
use crate::error::TimelineError;
use crate::event_store::{EventStoreStats, IngestReport};
use crate::types::{TimeBounds, WindowPage};
use crate::utils::{current_timestamp_ms, format_timestamp_ms};

/// Body of `POST /api/events`: one record or an array of records
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestBody {
    Batch(Vec<Value>),
    Single(Value),
}

impl IngestBody {
    fn into_records(self) -> Vec<Value> {
        match self {
            IngestBody::Batch(records) => records,
            IngestBody::Single(record) => vec![record],
        }
    }
}

/// POST /api/events - Append raw records to the log
pub async fn ingest_events(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<ApiResponse<IngestReport>>), TimelineError> {
    let records = body.into_records();
    let total = records.len();
    let latest = records
        .iter()
        .filter_map(|r| r.get("timestamp").and_then(Value::as_i64))
        .max()
        .and_then(format_timestamp_ms)
        .unwrap_or_else(|| "-".to_string());

    let store = Arc::clone(&state.store);
    let report = tokio::task::spawn_blocking(move || store.append_batch(records))
        .await
        .map_err(|e| TimelineError::Internal(format!("ingest task failed: {}", e)))??;

    info!(
        received = total,
        accepted = report.accepted,
        rejected = report.rejected.len(),
        latest = %latest,
        "ingested records"
    );

    let status = if report.accepted > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::with_total(report, state.current_sequence_id(), total)),
    ))
}

/// Query parameters for window pages
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// Inclusive upper bound; defaults to now
    pub end: Option<i64>,
    pub cursor: Option<String>,
}

/// GET /api/workspaces/:id/events - One page of content edits
pub async fn list_window(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<WindowPage> {
    let end = params.end.unwrap_or_else(current_timestamp_ms);
    let page = state
        .store
        .list_by_time_window(&workspace_id, end, params.cursor.as_deref())?;

    debug!(workspace = %workspace_id, end, count = page.events.len(), "served window page");
    let count = page.events.len();
    Ok(Json(ApiResponse::with_total(page, state.current_sequence_id(), count)))
}

/// Query parameters for bounds
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsParams {
    pub as_of: Option<i64>,
}

/// GET /api/workspaces - Known workspace ids
pub async fn list_workspaces(State(state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    let workspaces = state.store.list_workspaces();
    let total = workspaces.len();
    Ok(Json(ApiResponse::with_total(workspaces, state.current_sequence_id(), total)))
}

/// GET /api/workspaces/:id/bounds - Earliest and latest recorded timestamps
pub async fn get_bounds(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Query(params): Query<BoundsParams>,
) -> ApiResult<TimeBounds> {
    let as_of = params.as_of.unwrap_or_else(current_timestamp_ms);
    let bounds = state.store.get_bounds(&workspace_id, as_of);
    Ok(Json(ApiResponse::new(bounds, state.current_sequence_id())))
}

/// GET /api/debug/events - Every stored record grouped by workspace
pub async fn list_grouped(State(state): State<Arc<AppState>>) -> ApiResult<HashMap<String, Vec<Value>>> {
    let groups = state.store.list_all_grouped_by_workspace();
    let total = groups.values().map(Vec::len).sum();
    Ok(Json(ApiResponse::with_total(groups, state.current_sequence_id(), total)))
}

/// GET /api/stats - Store statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<EventStoreStats> {
    let stats = state.store.stats()?;
    Ok(Json(ApiResponse::new(stats, state.current_sequence_id())))
}
