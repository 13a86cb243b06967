use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::DetectDuplicatesResponse;

#[derive(Error, Debug)]
pub enum DuplicateDetectionError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid {table} row: {message}")]
    InvalidRow { table: &'static str, message: String },

    #[error("Candidate set of {found} professionals exceeds the limit of {limit}; narrow the scan with tenant_id")]
    CandidateLimitExceeded { found: usize, limit: usize },
}

impl IntoResponse for DuplicateDetectionError {
    fn into_response(self) -> Response {
        let status = match &self {
            DuplicateDetectionError::CandidateLimitExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DuplicateDetectionError::Database(_)
            | DuplicateDetectionError::InvalidRow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Duplicate detection failed ({}): {}", status, self);

        (status, Json(DetectDuplicatesResponse::failure(self.to_string()))).into_response()
    }
}
