//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ScoringError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-facing wrapper around pipeline errors.
///
/// Validation failures map to 400, an unloaded classifier and internal
/// scoring failures to 500. The body always carries the human-readable
/// message under an `error` key and nothing else.
#[derive(Debug)]
pub struct ApiError(pub ScoringError);

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ScoringError::Validation(_) => StatusCode::BAD_REQUEST,
            ScoringError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ScoringError::Internal(msg) => {
                tracing::error!("Scoring failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.0.to_string()
        }));

        (status, body).into_response()
    }
}
