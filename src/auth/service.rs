//! Challenge-response authentication orchestrator.
//!
//! Per-address flow: a nonce request always succeeds and overwrites any
//! pending challenge; login consumes the challenge, recovers the signer from
//! the signature, and only a case-insensitive address match mints a session.
//! The nonce is cleared on every login outcome — success, mismatch, or a
//! malformed signature — so a captured challenge cannot be replayed or used
//! for probing.

use chrono::Duration;

use super::error::{AuthError, AuthErrorCode};
use super::nonce::NonceStore;
use super::session::{Claims, SessionIssuer};
use super::signature::{normalize_address, recover_signer};
use crate::db::UserStore;

#[derive(Clone)]
pub struct AuthService {
    nonces: NonceStore,
    sessions: SessionIssuer,
    nonce_ttl: Duration,
}

impl AuthService {
    pub fn new(users: UserStore, sessions: SessionIssuer, nonce_ttl_secs: i64) -> Self {
        Self {
            nonces: NonceStore::new(users),
            sessions,
            nonce_ttl: Duration::seconds(nonce_ttl_secs),
        }
    }

    /// Issue a challenge for the address. The identity row is created here,
    /// on first sight, not on first successful login.
    pub async fn challenge(&self, address: &str) -> Result<(String, String), AuthError> {
        let address = normalize_address(address)?;
        let challenge = self.nonces.issue(&address).await?;
        tracing::info!("issued auth challenge for {}", address);
        Ok((address, challenge))
    }

    /// Verify a signed challenge and mint a session token.
    pub async fn login(&self, address: &str, signature: &str) -> Result<String, AuthError> {
        let address = normalize_address(address)?;

        let challenge = self
            .nonces
            .consume_if_valid(&address, self.nonce_ttl)
            .await?;

        let recovered = match recover_signer(&challenge, signature) {
            Ok(addr) => addr,
            Err(e) => {
                // Single-use even on a malformed signature.
                self.clear_best_effort(&address).await;
                return Err(e);
            }
        };

        if recovered != address {
            self.clear_best_effort(&address).await;
            tracing::warn!(
                "login rejected for {}: signature recovered {}",
                address,
                recovered
            );
            return Err(AuthError::from_code(AuthErrorCode::AddressMismatch));
        }

        // Invalidate the nonce before the credential exists, so the two
        // can never both be live.
        self.nonces.clear(&address).await?;
        let token = self.sessions.issue(&address)?;
        tracing::info!("login succeeded for {}", address);
        Ok(token)
    }

    /// Verify a bearer token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.sessions.verify(token)
    }

    async fn clear_best_effort(&self, address: &str) {
        if let Err(e) = self.nonces.clear(address).await {
            tracing::warn!("failed to clear nonce for {}: {}", address, e);
        }
    }
}
