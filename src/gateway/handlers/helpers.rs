//! Handler helper functions
//!
//! Shared utilities used by multiple handlers: ownership checks, multipart
//! upload extraction, and the repository fingerprint refresh that follows
//! every block mutation.

use axum::extract::Multipart;
use uuid::Uuid;

use super::super::state::AppState;
use crate::error::ApiError;
use crate::fingerprint;
use crate::models::Repository;
use crate::storage::BlobStore;

/// One file pulled out of a multipart body.
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Extract the first file field from a multipart body.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Failed to read upload: {}", e)))?
            .to_vec();
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("Uploaded file is empty".to_string()));
        }
        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }
    Err(ApiError::InvalidInput(
        "No file field in multipart body".to_string(),
    ))
}

pub fn require_storage(state: &AppState) -> Result<&BlobStore, ApiError> {
    state.storage.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("File storage is not configured".to_string())
    })
}

/// Only the repository owner may mutate it.
pub fn require_repo_owner(repo: &Repository, address: &str) -> Result<(), ApiError> {
    if repo.owner_address.eq_ignore_ascii_case(address) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the repository owner may do this".to_string(),
        ))
    }
}

/// Owner and listed collaborators can see private repositories.
pub fn can_view(repo: &Repository, address: &str) -> bool {
    repo.visibility == "public" || can_write(repo, address)
}

/// Owner and listed collaborators may add blocks.
pub fn can_write(repo: &Repository, address: &str) -> bool {
    repo.owner_address.eq_ignore_ascii_case(address)
        || repo
            .collaborators
            .iter()
            .any(|c| c.id.eq_ignore_ascii_case(address))
}

/// Recompute and persist the parent repository's content fingerprint.
///
/// Runs after every block create/update/delete. Not transactional with the
/// mutation that triggered it; the fingerprint is advisory and anchoring
/// re-reads immediately before submission.
pub async fn refresh_fingerprint(state: &AppState, repo_id: Uuid) -> Result<String, ApiError> {
    let blocks = state.blocks.list_for_repo(repo_id).await?;
    let hash = fingerprint::repository_fingerprint(&blocks);
    state.repos.set_current_hash(repo_id, &hash).await?;
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collaborator;
    use chrono::Utc;
    use sqlx::types::Json;

    fn repo(visibility: &str, owner: &str, collaborators: Vec<Collaborator>) -> Repository {
        Repository {
            id: Uuid::nil(),
            name: "r".to_string(),
            description: None,
            visibility: visibility.to_string(),
            owner_address: owner.to_string(),
            stars: 0,
            forks: 0,
            donations: 0.0,
            collaborators: Json(collaborators),
            current_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_repo_is_visible_but_not_writable() {
        let r = repo("public", "0xaaa", vec![]);
        assert!(can_view(&r, "0xbbb"));
        assert!(!can_write(&r, "0xbbb"));
    }

    #[test]
    fn test_private_repo_hidden_from_strangers() {
        let r = repo("private", "0xaaa", vec![]);
        assert!(!can_view(&r, "0xbbb"));
        assert!(can_view(&r, "0xAAA")); // owner, case-insensitive
    }

    #[test]
    fn test_collaborator_can_view_and_write() {
        let r = repo("private", "0xaaa", vec![Collaborator::owner("0xccc")]);
        assert!(can_view(&r, "0xccc"));
        assert!(can_write(&r, "0xCCC"));
    }

    #[test]
    fn test_only_owner_passes_owner_check() {
        let r = repo("public", "0xaaa", vec![]);
        assert!(require_repo_owner(&r, "0xAaA").is_ok());
        assert!(require_repo_owner(&r, "0xbbb").is_err());
    }
}
