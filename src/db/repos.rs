//! Repository rows and the star join table.
//!
//! Counter updates go through single-statement SQL increments so concurrent
//! requests never lose updates; there is no in-process locking.

use sqlx::postgres::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{Collaborator, Repository};

#[derive(Debug, Default, Clone)]
pub struct RepoPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Clone)]
pub struct RepoStore {
    pool: PgPool,
}

impl RepoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        name: &str,
        description: Option<&str>,
        visibility: &str,
        owner_address: &str,
    ) -> Result<Repository, sqlx::Error> {
        let collaborators = Json(vec![Collaborator::owner(owner_address)]);
        sqlx::query_as::<_, Repository>(
            "INSERT INTO repositories \
               (id, name, description, visibility, owner_address, stars, forks, donations, \
                collaborators, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, 0, 0, $6, now(), now()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(visibility)
        .bind(owner_address)
        .bind(collaborators)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Repository>, sqlx::Error> {
        sqlx::query_as::<_, Repository>("SELECT * FROM repositories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_public(&self) -> Result<Vec<Repository>, sqlx::Error> {
        sqlx::query_as::<_, Repository>(
            "SELECT * FROM repositories WHERE visibility = 'public' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_by_owner(&self, owner_address: &str) -> Result<Vec<Repository>, sqlx::Error> {
        sqlx::query_as::<_, Repository>(
            "SELECT * FROM repositories WHERE owner_address = $1 ORDER BY created_at DESC",
        )
        .bind(owner_address)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update(&self, id: Uuid, patch: &RepoPatch) -> Result<Repository, sqlx::Error> {
        sqlx::query_as::<_, Repository>(
            "UPDATE repositories SET \
               name = COALESCE($2, name), \
               description = COALESCE($3, description), \
               visibility = COALESCE($4, visibility), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.visibility)
        .fetch_one(&self.pool)
        .await
    }

    /// Write the derived content fingerprint. Not transactional with block
    /// mutations; see the fingerprint module docs.
    pub async fn set_current_hash(&self, id: Uuid, hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE repositories SET current_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Insert the star row (unique per user+repo) then bump the counter.
    /// Returns the new star count.
    pub async fn star(&self, user_address: &str, repo_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query("INSERT INTO user_repository_stars (user_address, repo_id) VALUES ($1, $2)")
            .bind(user_address)
            .bind(repo_id)
            .execute(&self.pool)
            .await?;

        sqlx::query_scalar::<_, i64>(
            "UPDATE repositories SET stars = stars + 1 WHERE id = $1 RETURNING stars",
        )
        .bind(repo_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn unstar(&self, user_address: &str, repo_id: Uuid) -> Result<i64, sqlx::Error> {
        let removed = sqlx::query(
            "DELETE FROM user_repository_stars WHERE user_address = $1 AND repo_id = $2",
        )
        .bind(user_address)
        .bind(repo_id)
        .execute(&self.pool)
        .await?;

        if removed.rows_affected() == 0 {
            return sqlx::query_scalar::<_, i64>("SELECT stars FROM repositories WHERE id = $1")
                .bind(repo_id)
                .fetch_one(&self.pool)
                .await;
        }

        sqlx::query_scalar::<_, i64>(
            "UPDATE repositories SET stars = GREATEST(stars - 1, 0) WHERE id = $1 RETURNING stars",
        )
        .bind(repo_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn starred_by(&self, user_address: &str) -> Result<Vec<Repository>, sqlx::Error> {
        sqlx::query_as::<_, Repository>(
            "SELECT r.* FROM repositories r \
             JOIN user_repository_stars s ON s.repo_id = r.id \
             WHERE s.user_address = $1 \
             ORDER BY r.created_at DESC",
        )
        .bind(user_address)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn bump_forks(&self, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE repositories SET forks = forks + 1 WHERE id = $1 RETURNING forks",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }
}
