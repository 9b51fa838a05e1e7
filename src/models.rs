// models.rs - Persistent record types (users, repositories, blocks, audit logs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public profile of a wallet-identified user.
///
/// The `users` row also carries the pending auth nonce; that never leaves the
/// auth layer and is deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserProfile {
    /// Lowercased `0x…` wallet address, primary identity key.
    pub address: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collaborator entry stored inside `repositories.collaborators` (JSONB).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Collaborator {
    /// Wallet address of the collaborator.
    pub id: String,
    pub name: String,
    /// owner | maintainer | contributor | viewer
    pub role: String,
}

impl Collaborator {
    pub fn owner(address: &str) -> Self {
        Self {
            id: address.to_string(),
            name: "Owner".to_string(),
            role: "owner".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Repository {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// public | private
    pub visibility: String,
    pub owner_address: String,
    pub stars: i64,
    pub forks: i64,
    pub donations: f64,
    #[schema(value_type = Vec<Collaborator>)]
    pub collaborators: Json<Vec<Collaborator>>,
    /// Derived content fingerprint; recomputed on every block mutation,
    /// never settable by a client.
    pub current_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit verdict states for a content block.
///
/// Transitions are driven only by the AI audit callback; clients cannot set
/// the status directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    InReview,
    Approved,
    Rejected,
}

impl BlockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_review" => Some(Self::InReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// One ordered content unit inside a repository.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Block {
    pub id: Uuid,
    pub repo_id: Uuid,
    /// text | image | video | audio | reference
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Structured payload; shape depends on `type`.
    #[schema(value_type = Object)]
    pub content: Value,
    /// See [`BlockStatus`]; stored as text.
    pub status: String,
    pub owner_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable record of one AI audit callback. Append-only: callbacks never
/// overwrite prior entries.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub prediction_id: String,
    pub block_id: Uuid,
    pub repo_id: Uuid,
    pub ai_status: String,
    pub ai_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_status_round_trip() {
        for status in [
            BlockStatus::InReview,
            BlockStatus::Approved,
            BlockStatus::Rejected,
        ] {
            assert_eq!(BlockStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BlockStatus::parse("validated"), None);
    }

    #[test]
    fn test_block_serializes_type_field() {
        let block = Block {
            id: Uuid::nil(),
            repo_id: Uuid::nil(),
            kind: "text".to_string(),
            title: None,
            description: None,
            content: serde_json::json!({}),
            status: BlockStatus::InReview.as_str().to_string(),
            owner_address: "0xabc".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json.get("kind").is_none());
    }
}
