//! AI audit webhook and audit history.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::ApiResponse;
use crate::error::ApiError;
use crate::models::{AuditLogEntry, BlockStatus};

const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditWebhookPayload {
    /// Id assigned by the analysis service
    pub prediction_id: String,
    pub block_id: Uuid,
    pub repo_id: Uuid,
    /// approved | rejected
    pub ai_status: String,
    pub ai_description: Option<String>,
    /// Opaque analysis output, logged but not stored
    #[allow(dead_code)]
    #[schema(value_type = Option<Object>)]
    pub raw_response: Option<Value>,
}

/// A missing configured secret refuses all callbacks (503); a missing or
/// wrong header is an auth failure (401). Nothing is written either way.
fn check_secret(expected: Option<&str>, presented: Option<&str>) -> Result<(), ApiError> {
    let expected = expected.ok_or_else(|| {
        ApiError::ServiceUnavailable("Audit webhook secret is not configured".to_string())
    })?;
    match presented {
        Some(secret) if secret == expected => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Invalid webhook secret".to_string(),
        )),
    }
}

/// Callback from the AI analysis service with a verdict for one block.
///
/// Authenticated by the `x-webhook-secret` header, not by bearer token.
/// Flips the block status and appends an immutable audit log row; nothing is
/// written when the secret does not match or the block no longer exists.
#[utoipa::path(
    post,
    path = "/api/v1/audits/webhook/block-audit",
    request_body = AuditWebhookPayload,
    responses(
        (status = 200, description = "Recorded audit entry", body = AuditLogEntry),
        (status = 400, description = "Unknown ai_status"),
        (status = 401, description = "Missing or wrong webhook secret"),
        (status = 404, description = "Block no longer exists"),
        (status = 503, description = "Webhook secret not configured")
    ),
    tag = "Audits"
)]
pub async fn block_audit_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AuditWebhookPayload>,
) -> Result<Json<ApiResponse<AuditLogEntry>>, ApiError> {
    check_secret(
        state.webhook_secret.as_deref(),
        headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok()),
    )?;

    let verdict = match BlockStatus::parse(&payload.ai_status) {
        Some(BlockStatus::Approved) => BlockStatus::Approved,
        Some(BlockStatus::Rejected) => BlockStatus::Rejected,
        _ => {
            return Err(ApiError::InvalidInput(format!(
                "ai_status must be approved or rejected, got {}",
                payload.ai_status
            )));
        }
    };

    let entry = state
        .audits
        .record_verdict(
            &payload.prediction_id,
            payload.block_id,
            payload.repo_id,
            verdict,
            payload.ai_description.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Block not found".to_string()))?;

    tracing::info!(
        "audit verdict {} recorded for block {}",
        payload.ai_status,
        payload.block_id
    );
    Ok(Json(ApiResponse::success(entry)))
}

/// Audit history for a repository, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/audits/repos/{repo_id}",
    params(("repo_id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Audit log entries", body = Vec<AuditLogEntry>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Audits"
)]
pub async fn list_audits(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>, ApiError> {
    let entries = state.audits.list_for_repo(repo_id).await?;
    Ok(Json(ApiResponse::success(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unset_secret_refuses_callbacks() {
        let err = check_secret(None, Some("anything")).unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_wrong_or_missing_secret_is_unauthorized() {
        let err = check_secret(Some("s3cret"), Some("wrong")).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = check_secret(Some("s3cret"), None).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_matching_secret_passes() {
        assert!(check_secret(Some("s3cret"), Some("s3cret")).is_ok());
    }
}
