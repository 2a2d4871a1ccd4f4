//! REST API module for HTTP endpoints
//!
//! - `POST /api/events` - Ingest raw editor records
//! - `GET /api/workspaces/:id/events` - One page of a replay window
//! - `GET /api/workspaces/:id/bounds` - Recorded time bounds
//! - `GET /api/workspaces/:id/buffer` - Reconstructed file at a prefix
//! - `GET /api/workspaces/:id/files` - Files edited in a window
//! - `GET /api/debug/events` - Every record grouped by workspace
//! - `GET /api/stats` - Store statistics
//! - `/api/sessions/...` - Scrub sessions

pub mod events;
pub mod replay;
pub mod sessions;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::TimelineError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Next store sequence; changes whenever the log grows
    pub sequence_id: u64,
    /// Total count (for collection responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, sequence_id: u64) -> Self {
        Self {
            data,
            sequence_id,
            total: None,
        }
    }

    pub fn with_total(data: T, sequence_id: u64, total: usize) -> Self {
        Self {
            data,
            sequence_id,
            total: Some(total),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl From<&TimelineError> for ApiError {
    fn from(err: &TimelineError) -> Self {
        Self {
            error: err.to_string(),
            code: err.error_code().to_string(),
        }
    }
}

/// HTTP status for each error kind
pub fn status_for(err: &TimelineError) -> StatusCode {
    match err {
        TimelineError::InvalidRecord(_) | TimelineError::InvalidCursor(_) => StatusCode::BAD_REQUEST,
        TimelineError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        TimelineError::SessionClosed(_) => StatusCode::GONE,
        TimelineError::StaleFetch { .. } => StatusCode::CONFLICT,
        TimelineError::Io(_) | TimelineError::Json(_) | TimelineError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for TimelineError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_client_error() {
            debug!(error = %self, code = self.error_code(), "request rejected");
        } else {
            error!(error = %self, "request failed");
        }
        (status, Json(ApiError::from(&self))).into_response()
    }
}

/// Result type of every JSON handler
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, TimelineError>;
