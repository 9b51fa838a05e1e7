//! Audit log rows: append-only history of AI audit callbacks.

use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{AuditLogEntry, BlockStatus};

#[derive(Clone)]
pub struct AuditStore {
    pool: PgPool,
}

impl AuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply one audit verdict: flip the block status, then append the log
    /// row. Returns `Ok(None)` when the referenced block does not exist, in
    /// which case nothing is written.
    pub async fn record_verdict(
        &self,
        prediction_id: &str,
        block_id: Uuid,
        repo_id: Uuid,
        verdict: BlockStatus,
        ai_description: Option<&str>,
    ) -> Result<Option<AuditLogEntry>, sqlx::Error> {
        let updated =
            sqlx::query("UPDATE blocks SET status = $2, updated_at = now() WHERE id = $1")
                .bind(block_id)
                .bind(verdict.as_str())
                .execute(&self.pool)
                .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let entry = sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_logs \
               (id, prediction_id, block_id, repo_id, ai_status, ai_description, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(prediction_id)
        .bind(block_id)
        .bind(repo_id)
        .bind(verdict.as_str())
        .bind(ai_description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(entry))
    }

    pub async fn list_for_repo(&self, repo_id: Uuid) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_logs WHERE repo_id = $1 ORDER BY created_at DESC",
        )
        .bind(repo_id)
        .fetch_all(&self.pool)
        .await
    }
}
