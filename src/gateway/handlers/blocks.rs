//! Content block handlers.
//!
//! Every mutation refreshes the parent repository's content fingerprint;
//! block creation also submits the block for AI analysis from a spawned task.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::ApiResponse;
use super::helpers::{can_write, read_upload, refresh_fingerprint, require_storage};
use crate::auth::Claims;
use crate::db::BlockPatch;
use crate::error::ApiError;
use crate::models::{Block, Repository};
use crate::storage::BlobStore;

const BLOCK_KINDS: [&str; 5] = ["text", "image", "video", "audio", "reference"];

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlockRequest {
    pub repo_id: Uuid,
    /// text | image | video | audio | reference
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    /// Structured payload, shape depends on `type`
    #[schema(value_type = Object)]
    pub content: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBlockRequest {
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssetQuery {
    /// URL previously returned by an asset upload
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    pub url: String,
}

fn check_kind(kind: &str) -> Result<(), ApiError> {
    if BLOCK_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "type must be one of {}, got {}",
            BLOCK_KINDS.join("|"),
            kind
        )))
    }
}

async fn load_block(state: &AppState, id: Uuid) -> Result<Block, ApiError> {
    state
        .blocks
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Block not found".to_string()))
}

/// Block owner and repository owner may mutate a block.
fn require_block_access(block: &Block, repo: &Repository, address: &str) -> Result<(), ApiError> {
    if block.owner_address.eq_ignore_ascii_case(address)
        || repo.owner_address.eq_ignore_ascii_case(address)
    {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the block or repository owner may do this".to_string(),
        ))
    }
}

/// Create a block in a repository the caller can write to.
///
/// The parent fingerprint is refreshed before the response; AI analysis is
/// submitted fire-and-forget.
#[utoipa::path(
    post,
    path = "/api/v1/blocks",
    request_body = CreateBlockRequest,
    responses(
        (status = 200, description = "Created block", body = Block),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller may not write to this repository"),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Blocks"
)]
pub async fn create_block(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBlockRequest>,
) -> Result<Json<ApiResponse<Block>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    check_kind(&req.kind)?;

    let repo = state
        .repos
        .get(req.repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    if !can_write(&repo, &claims.sub) {
        return Err(ApiError::Forbidden(
            "Caller may not write to this repository".to_string(),
        ));
    }

    let block = state
        .blocks
        .insert(
            req.repo_id,
            &req.kind,
            req.title.as_deref(),
            req.description.as_deref(),
            &req.content,
            &claims.sub,
        )
        .await?;

    refresh_fingerprint(&state, req.repo_id).await?;

    if let Some(ai) = &state.ai {
        ai.spawn_submit(&block);
    }

    Ok(Json(ApiResponse::success(block)))
}

/// Fetch one block.
#[utoipa::path(
    get,
    path = "/api/v1/blocks/{id}",
    params(("id" = Uuid, Path, description = "Block id")),
    responses(
        (status = 200, description = "Block", body = Block),
        (status = 404, description = "Unknown block")
    ),
    tag = "Blocks"
)]
pub async fn get_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Block>>, ApiError> {
    let block = load_block(&state, id).await?;
    Ok(Json(ApiResponse::success(block)))
}

/// Blocks of a repository in canonical order (created_at, then id).
#[utoipa::path(
    get,
    path = "/api/v1/blocks/repo/{repo_id}",
    params(("repo_id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Blocks", body = Vec<Block>),
        (status = 404, description = "Unknown repository")
    ),
    tag = "Blocks"
)]
pub async fn list_blocks(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Block>>>, ApiError> {
    state
        .repos
        .get(repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    let blocks = state.blocks.list_for_repo(repo_id).await?;
    Ok(Json(ApiResponse::success(blocks)))
}

/// Update a block's title, description, or content.
#[utoipa::path(
    put,
    path = "/api/v1/blocks/{id}",
    params(("id" = Uuid, Path, description = "Block id")),
    request_body = UpdateBlockRequest,
    responses(
        (status = 200, description = "Updated block", body = Block),
        (status = 403, description = "Caller owns neither block nor repository"),
        (status = 404, description = "Unknown block")
    ),
    security(("bearer_auth" = [])),
    tag = "Blocks"
)]
pub async fn update_block(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlockRequest>,
) -> Result<Json<ApiResponse<Block>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let block = load_block(&state, id).await?;
    let repo = state
        .repos
        .get(block.repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    require_block_access(&block, &repo, &claims.sub)?;

    let patch = BlockPatch {
        title: req.title,
        description: req.description,
        content: req.content,
    };
    let updated = state.blocks.update(id, &patch).await?;
    refresh_fingerprint(&state, block.repo_id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete a block and refresh the parent fingerprint.
#[utoipa::path(
    delete,
    path = "/api/v1/blocks/{id}",
    params(("id" = Uuid, Path, description = "Block id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Caller owns neither block nor repository"),
        (status = 404, description = "Unknown block")
    ),
    security(("bearer_auth" = [])),
    tag = "Blocks"
)]
pub async fn delete_block(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let block = load_block(&state, id).await?;
    let repo = state
        .repos
        .get(block.repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    require_block_access(&block, &repo, &claims.sub)?;

    state.blocks.delete(id).await?;
    refresh_fingerprint(&state, block.repo_id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Upload a media asset for a block and return its URL.
#[utoipa::path(
    post,
    path = "/api/v1/blocks/{id}/assets",
    params(("id" = Uuid, Path, description = "Block id")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored asset URL", body = AssetResponse),
        (status = 403, description = "Caller owns neither block nor repository"),
        (status = 404, description = "Unknown block"),
        (status = 503, description = "Blob store not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Blocks"
)]
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let storage = require_storage(&state)?;

    let block = load_block(&state, id).await?;
    let repo = state
        .repos
        .get(block.repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    require_block_access(&block, &repo, &claims.sub)?;

    let upload = read_upload(multipart).await?;
    let key = BlobStore::object_key("blocks", &claims.sub, &upload.filename);
    storage
        .put(&key, upload.bytes, &upload.content_type)
        .await?;
    let url = storage
        .url_for(&key)
        .await?;

    Ok(Json(ApiResponse::success(AssetResponse { url })))
}

/// Delete a previously uploaded asset by its URL.
#[utoipa::path(
    delete,
    path = "/api/v1/blocks/{id}/assets",
    params(
        ("id" = Uuid, Path, description = "Block id"),
        ("url" = String, Query, description = "Asset URL to delete")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "URL was not produced by this store"),
        (status = 403, description = "Caller owns neither block nor repository"),
        (status = 404, description = "Unknown block"),
        (status = 503, description = "Blob store not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Blocks"
)]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let storage = require_storage(&state)?;

    let block = load_block(&state, id).await?;
    let repo = state
        .repos
        .get(block.repo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    require_block_access(&block, &repo, &claims.sub)?;

    let key = storage.key_from_url(&query.url).ok_or_else(|| {
        ApiError::InvalidInput("URL was not produced by this store".to_string())
    })?;
    storage
        .delete(&key)
        .await?;

    Ok(Json(ApiResponse::success(())))
}
