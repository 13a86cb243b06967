use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{DetectDuplicatesRequest, DetectDuplicatesResponse};
use crate::services::detection::DuplicateDetectionService;

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

/// `POST /duplicates/detect`: body `{ "tenant_id"?: string }`. An unreadable
/// body is treated as an unfiltered scan rather than rejected.
#[axum::debug_handler]
pub async fn detect_duplicates(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    body: Bytes,
) -> Result<Response, AppError> {
    require_admin(&user)?;

    let request = DetectDuplicatesRequest::from_body(&body);
    info!(
        "Duplicate scan requested by {} (tenant: {})",
        user.id,
        request.tenant_filter().unwrap_or("all")
    );

    let detection_service = DuplicateDetectionService::new(&state);

    let result = detection_service
        .detect_duplicates(request.tenant_filter())
        .await
        .map(|report| Json(DetectDuplicatesResponse::from(report)));

    Ok(result.into_response())
}
