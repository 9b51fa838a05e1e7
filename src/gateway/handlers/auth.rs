//! Wallet challenge-response auth endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiResponse;
use crate::auth::{AuthError, Claims};

#[derive(Debug, Deserialize, ToSchema)]
pub struct NonceRequest {
    /// Wallet address, `0x` + 40 hex chars
    #[schema(example = "0x742d35cc6634c0532925a3b844bc9e7595f0beb1")]
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NonceResponse {
    /// Normalized (lowercased) wallet address
    pub address: String,
    /// Full challenge message the wallet must sign
    pub nonce: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub address: String,
    /// Hex-encoded 65-byte EIP-191 personal-sign signature
    pub signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 bearer token
    pub token: String,
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    pub address: String,
    /// Unix seconds when the session expires
    pub expires_at: i64,
}

/// Request a signing challenge for a wallet address.
///
/// Always succeeds for a well-formed address; any pending challenge for the
/// same address is replaced.
#[utoipa::path(
    post,
    path = "/api/v1/auth/nonce",
    request_body = NonceRequest,
    responses(
        (status = 200, description = "Challenge issued", body = NonceResponse),
        (status = 400, description = "Malformed wallet address"),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Auth"
)]
pub async fn request_nonce(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NonceRequest>,
) -> Result<Json<ApiResponse<NonceResponse>>, AuthError> {
    let (address, nonce) = state.auth.challenge(&req.address).await?;
    Ok(Json(ApiResponse::success(NonceResponse { address, nonce })))
}

/// Exchange a signed challenge for a session token.
///
/// The challenge is single-use: it is invalidated on success, on signature
/// mismatch, and on expiry.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token minted", body = LoginResponse),
        (status = 401, description = "Missing, expired, or mismatching challenge/signature"),
        (status = 400, description = "Malformed wallet address")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AuthError> {
    let token = state.auth.login(&req.address, &req.signature).await?;
    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        address: req.address.to_lowercase(),
    })))
}

/// Identity behind the presented bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current session", body = SessionInfo),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    Extension(claims): Extension<Claims>,
) -> Json<ApiResponse<SessionInfo>> {
    Json(ApiResponse::success(SessionInfo {
        address: claims.sub,
        expires_at: claims.exp as i64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionIssuer;

    const ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    #[tokio::test]
    async fn test_me_reports_the_token_expiry() {
        let issuer = SessionIssuer::new("test-secret".to_string(), 3600);
        let token = issuer.issue(ADDRESS).unwrap();
        let claims = issuer.verify(&token).unwrap();
        let exp = claims.exp;

        let resp = me(Extension(claims)).await;
        let info = resp.0.data.unwrap();
        assert_eq!(info.address, ADDRESS);
        assert_eq!(info.expires_at, exp as i64);
    }
}
