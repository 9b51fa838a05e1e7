//! Session credentials: compact HS256 JWTs binding a wallet address.
//!
//! Stateless by design — validity is the signature plus the expiry check,
//! nothing server-side. There is no revocation list; a leaked token stays
//! valid until its TTL runs out.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::error::{AuthError, AuthErrorCode};

/// JWT claims: subject is the lowercased wallet address.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionIssuer {
    secret: String,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: String, ttl_secs: i64) -> Self {
        Self {
            secret,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Mint a bearer token for the address.
    pub fn issue(&self, address: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: address.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("token encoding failed: {}", e);
            AuthError::from_code(AuthErrorCode::Unavailable)
        })
    }

    /// Decode and verify a bearer token, distinguishing expiry from all
    /// other failures so callers can tell the user to log in again vs.
    /// reject the request outright.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::from_code(AuthErrorCode::TokenExpired),
            _ => AuthError::from_code(AuthErrorCode::TokenInvalid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    fn issuer() -> SessionIssuer {
        SessionIssuer::new("test-secret".to_string(), 3600)
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue(ADDRESS).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, ADDRESS);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let issuer = SessionIssuer::new("test-secret".to_string(), -120);
        let token = issuer.issue(ADDRESS).unwrap();
        let err = issuer.verify(&token).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenExpired);
    }

    #[test]
    fn test_garbage_token_is_invalid_not_expired() {
        let err = issuer().verify("not.a.jwt").unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenInvalid);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(ADDRESS).unwrap();
        let other = SessionIssuer::new("different-secret".to_string(), 3600);
        let err = other.verify(&token).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::TokenInvalid);
    }
}
