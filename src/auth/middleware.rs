//! Bearer-token middleware for Axum.
//!
//! Verifies the `Authorization: Bearer <jwt>` header and injects the decoded
//! [`Claims`] as a request extension for protected handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::{AuthError, AuthErrorCode};
use super::session::Claims;
use crate::gateway::state::AppState;

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::MissingAuth))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::new(AuthErrorCode::MissingAuth, "Expected Bearer scheme"))?;

    let claims: Claims = state.auth.verify_token(token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
