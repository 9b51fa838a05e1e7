//! Block rows. Each block belongs to exactly one repository; the parent's
//! content fingerprint is recomputed by the caller after any mutation here.

use serde_json::Value;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{Block, BlockStatus};

#[derive(Debug, Default, Clone)]
pub struct BlockPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
}

#[derive(Clone)]
pub struct BlockStore {
    pool: PgPool,
}

impl BlockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        repo_id: Uuid,
        kind: &str,
        title: Option<&str>,
        description: Option<&str>,
        content: &Value,
        owner_address: &str,
    ) -> Result<Block, sqlx::Error> {
        sqlx::query_as::<_, Block>(
            "INSERT INTO blocks \
               (id, repo_id, type, title, description, content, status, owner_address, \
                created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(repo_id)
        .bind(kind)
        .bind(title)
        .bind(description)
        .bind(content)
        .bind(BlockStatus::InReview.as_str())
        .bind(owner_address)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Block>, sqlx::Error> {
        sqlx::query_as::<_, Block>("SELECT * FROM blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_for_repo(&self, repo_id: Uuid) -> Result<Vec<Block>, sqlx::Error> {
        // Canonical block order: created_at ascending, id as tiebreak.
        sqlx::query_as::<_, Block>(
            "SELECT * FROM blocks WHERE repo_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(repo_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update(&self, id: Uuid, patch: &BlockPatch) -> Result<Block, sqlx::Error> {
        sqlx::query_as::<_, Block>(
            "UPDATE blocks SET \
               title = COALESCE($2, title), \
               description = COALESCE($3, description), \
               content = COALESCE($4, content), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.content)
        .fetch_one(&self.pool)
        .await
    }

    /// Status transitions come only from the audit callback path.
    pub async fn set_status(&self, id: Uuid, status: BlockStatus) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("UPDATE blocks SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM blocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
