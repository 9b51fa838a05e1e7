//! User rows: profiles plus the pending auth nonce.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use crate::models::UserProfile;

const PROFILE_COLUMNS: &str =
    "address, username, email, bio, description, profile_image_url, created_at, updated_at";

/// Fields a user may change on their own profile. `None` leaves the column
/// untouched on upsert.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_address(&self, address: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE address = $1"
        ))
        .bind(address)
        .fetch_optional(&self.pool)
        .await
    }

    /// Store a fresh challenge for the address, creating the identity row on
    /// first sight. A prior unconsumed nonce is overwritten.
    pub async fn upsert_nonce(&self, address: &str, nonce: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (address, nonce, nonce_issued_at, created_at, updated_at) \
             VALUES ($1, $2, now(), now(), now()) \
             ON CONFLICT (address) \
             DO UPDATE SET nonce = $2, nonce_issued_at = now(), updated_at = now()",
        )
        .bind(address)
        .bind(nonce)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pending challenge and its issuance time, if any.
    pub async fn nonce_for(
        &self,
        address: &str,
    ) -> Result<Option<(Option<String>, Option<DateTime<Utc>>)>, sqlx::Error> {
        sqlx::query_as::<_, (Option<String>, Option<DateTime<Utc>>)>(
            "SELECT nonce, nonce_issued_at FROM users WHERE address = $1",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn clear_nonce(&self, address: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET nonce = NULL, nonce_issued_at = NULL WHERE address = $1")
            .bind(address)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upsert the profile fields keyed by address. On a unique-constraint
    /// race the upsert is retried once as an explicit update before failing.
    pub async fn upsert_profile(
        &self,
        address: &str,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, sqlx::Error> {
        let upsert = format!(
            "INSERT INTO users (address, username, email, bio, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) \
             ON CONFLICT (address) DO UPDATE SET \
               username = COALESCE($2, users.username), \
               email = COALESCE($3, users.email), \
               bio = COALESCE($4, users.bio), \
               description = COALESCE($5, users.description), \
               updated_at = now() \
             RETURNING {PROFILE_COLUMNS}"
        );

        let first = sqlx::query_as::<_, UserProfile>(&upsert)
            .bind(address)
            .bind(&patch.username)
            .bind(&patch.email)
            .bind(&patch.bio)
            .bind(&patch.description)
            .fetch_one(&self.pool)
            .await;

        match first {
            Ok(profile) => Ok(profile),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                tracing::warn!("profile upsert hit unique constraint, retrying as update");
                sqlx::query_as::<_, UserProfile>(&format!(
                    "UPDATE users SET \
                       username = COALESCE($2, username), \
                       email = COALESCE($3, email), \
                       bio = COALESCE($4, bio), \
                       description = COALESCE($5, description), \
                       updated_at = now() \
                     WHERE address = $1 \
                     RETURNING {PROFILE_COLUMNS}"
                ))
                .bind(address)
                .bind(&patch.username)
                .bind(&patch.email)
                .bind(&patch.bio)
                .bind(&patch.description)
                .fetch_one(&self.pool)
                .await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn set_avatar_url(
        &self,
        address: &str,
        url: Option<&str>,
    ) -> Result<UserProfile, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "UPDATE users SET profile_image_url = $2, updated_at = now() \
             WHERE address = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(address)
        .bind(url)
        .fetch_one(&self.pool)
        .await
    }
}
