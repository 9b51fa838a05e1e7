//! Wallet authentication error types.
//!
//! Provides structured error codes for the challenge/login/session flow.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::gateway::types::ApiResponse;

/// Wallet auth error codes (2001-2009).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 2001: Authorization header missing or malformed
    MissingAuth = 2001,
    /// 2002: Wallet address fails the 0x + 40 hex pattern
    InvalidAddress = 2002,
    /// 2003: No pending challenge for this address
    NonceNotFound = 2003,
    /// 2004: Challenge older than the expiry window
    NonceExpired = 2004,
    /// 2005: Signature malformed or recovery failed
    InvalidSignature = 2005,
    /// 2006: Recovered signer differs from the claimed address
    AddressMismatch = 2006,
    /// 2007: Session token past its expiry
    TokenExpired = 2007,
    /// 2008: Session token signature or shape invalid
    TokenInvalid = 2008,
    /// 2009: Backing store unreachable
    Unavailable = 2009,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidAddress => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Authentication error with message.
#[derive(Debug, Clone)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create error with default message.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = match code {
            AuthErrorCode::MissingAuth => "Missing or malformed Authorization header",
            AuthErrorCode::InvalidAddress => "Invalid wallet address format",
            AuthErrorCode::NonceNotFound => "No pending challenge, request a nonce first",
            AuthErrorCode::NonceExpired => "Challenge expired, request a new nonce",
            AuthErrorCode::InvalidSignature => "Signature verification failed",
            AuthErrorCode::AddressMismatch => "Signature does not match the claimed address",
            AuthErrorCode::TokenExpired => "Token expired",
            AuthErrorCode::TokenInvalid => "Invalid token",
            AuthErrorCode::Unavailable => "Authentication service unavailable",
        };
        Self::new(code, message)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthError {}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("auth store error: {}", e);
        Self::from_code(AuthErrorCode::Unavailable)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.code.code(), self.message);
        (self.code.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthErrorCode::MissingAuth.code(), 2001);
        assert_eq!(AuthErrorCode::Unavailable.code(), 2009);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(
            AuthErrorCode::InvalidSignature.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthErrorCode::InvalidAddress.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthErrorCode::Unavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_from_code() {
        let err = AuthError::from_code(AuthErrorCode::NonceExpired);
        assert_eq!(err.code, AuthErrorCode::NonceExpired);
        assert!(err.message.contains("new nonce"));
    }
}
