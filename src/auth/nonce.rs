//! Challenge nonce lifecycle.
//!
//! One pending challenge per address, persisted on the `users` row so it
//! survives restarts and is shared across server instances. Issuing a new
//! challenge overwrites any prior one; consumption is single-use.

use chrono::{Duration, Utc};

use super::error::{AuthError, AuthErrorCode};
use crate::db::UserStore;

/// Human-readable template the wallet asks the user to sign.
pub const CHALLENGE_PREFIX: &str =
    "Sign this message to authenticate with Infinita Science Hub: ";

#[derive(Clone)]
pub struct NonceStore {
    users: UserStore,
}

impl NonceStore {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    /// Generate and persist a fresh challenge for the address. Creates the
    /// identity row on first sight.
    pub async fn issue(&self, address: &str) -> Result<String, AuthError> {
        let token: [u8; 16] = rand::random();
        let challenge = format!("{}{}", CHALLENGE_PREFIX, hex::encode(token));
        self.users.upsert_nonce(address, &challenge).await?;
        Ok(challenge)
    }

    /// Read the pending challenge if it exists and is fresh.
    ///
    /// The caller clears the nonce after signature verification (success or
    /// mismatch alike). An expired challenge is cleared here before the
    /// rejection is returned.
    pub async fn consume_if_valid(
        &self,
        address: &str,
        max_age: Duration,
    ) -> Result<String, AuthError> {
        let record = self
            .users
            .nonce_for(address)
            .await?
            .ok_or_else(|| AuthError::from_code(AuthErrorCode::NonceNotFound))?;

        let (nonce, issued_at) = record;
        let challenge = nonce
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AuthError::from_code(AuthErrorCode::NonceNotFound))?;
        let issued_at =
            issued_at.ok_or_else(|| AuthError::from_code(AuthErrorCode::NonceNotFound))?;

        if Utc::now() - issued_at > max_age {
            if let Err(e) = self.users.clear_nonce(address).await {
                tracing::warn!("failed to clear expired nonce for {}: {}", address, e);
            }
            return Err(AuthError::from_code(AuthErrorCode::NonceExpired));
        }

        Ok(challenge)
    }

    pub async fn clear(&self, address: &str) -> Result<(), AuthError> {
        self.users.clear_nonce(address).await?;
        Ok(())
    }
}
