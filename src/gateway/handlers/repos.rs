//! Repository handlers: CRUD, stars, forks, and the on-chain anchor.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::ApiResponse;
use super::helpers::{can_view, refresh_fingerprint, require_repo_owner};
use crate::auth::Claims;
use crate::db::RepoPatch;
use crate::error::ApiError;
use crate::ledger::LedgerError;
use crate::models::Repository;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRepoRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    /// public | private (default public)
    pub visibility: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRepoRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StarResponse {
    pub repo_id: Uuid,
    pub stars: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnchorResponse {
    pub repo_id: Uuid,
    /// Fingerprint that was anchored, recomputed immediately before submission
    pub hash: String,
    /// Transaction hash returned by the ledger node
    pub tx_hash: String,
}

fn check_visibility(v: &Option<String>) -> Result<(), ApiError> {
    match v.as_deref() {
        None | Some("public") | Some("private") => Ok(()),
        Some(other) => Err(ApiError::InvalidInput(format!(
            "visibility must be public or private, got {}",
            other
        ))),
    }
}

async fn load_repo(state: &AppState, id: Uuid) -> Result<Repository, ApiError> {
    state
        .repos
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))
}

/// Create a repository owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/repos",
    request_body = CreateRepoRequest,
    responses(
        (status = 200, description = "Created repository", body = Repository),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn create_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateRepoRequest>,
) -> Result<Json<ApiResponse<Repository>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    check_visibility(&req.visibility)?;

    let repo = state
        .repos
        .insert(
            &req.name,
            req.description.as_deref(),
            req.visibility.as_deref().unwrap_or("public"),
            &claims.sub,
        )
        .await?;
    Ok(Json(ApiResponse::success(repo)))
}

/// List public repositories, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/repos",
    responses((status = 200, description = "Public repositories", body = Vec<Repository>)),
    tag = "Repos"
)]
pub async fn list_repos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Repository>>>, ApiError> {
    let repos = state.repos.list_public().await?;
    Ok(Json(ApiResponse::success(repos)))
}

/// Repositories owned by the caller, private ones included.
#[utoipa::path(
    get,
    path = "/api/v1/repos/mine",
    responses(
        (status = 200, description = "Own repositories", body = Vec<Repository>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn my_repos(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Repository>>>, ApiError> {
    let repos = state.repos.list_by_owner(&claims.sub).await?;
    Ok(Json(ApiResponse::success(repos)))
}

/// Repositories the caller has starred.
#[utoipa::path(
    get,
    path = "/api/v1/repos/starred",
    responses(
        (status = 200, description = "Starred repositories", body = Vec<Repository>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn starred_repos(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Repository>>>, ApiError> {
    let repos = state.repos.starred_by(&claims.sub).await?;
    Ok(Json(ApiResponse::success(repos)))
}

/// Fetch one repository. Private repositories are visible to the owner and
/// listed collaborators only.
#[utoipa::path(
    get,
    path = "/api/v1/repos/{id}",
    params(("id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Repository", body = Repository),
        (status = 403, description = "Private repository, caller not a collaborator"),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn get_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Repository>>, ApiError> {
    let repo = load_repo(&state, id).await?;
    if !can_view(&repo, &claims.sub) {
        return Err(ApiError::Forbidden(
            "Repository is private".to_string(),
        ));
    }
    Ok(Json(ApiResponse::success(repo)))
}

/// Update name, description, or visibility. Owner only.
#[utoipa::path(
    put,
    path = "/api/v1/repos/{id}",
    params(("id" = Uuid, Path, description = "Repository id")),
    request_body = UpdateRepoRequest,
    responses(
        (status = 200, description = "Updated repository", body = Repository),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn update_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRepoRequest>,
) -> Result<Json<ApiResponse<Repository>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    check_visibility(&req.visibility)?;

    let repo = load_repo(&state, id).await?;
    require_repo_owner(&repo, &claims.sub)?;

    let patch = RepoPatch {
        name: req.name,
        description: req.description,
        visibility: req.visibility,
    };
    let updated = state.repos.update(id, &patch).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete a repository and everything in it. Owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/repos/{id}",
    params(("id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn delete_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let repo = load_repo(&state, id).await?;
    require_repo_owner(&repo, &claims.sub)?;
    state.repos.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Star a repository. Starring twice is a conflict.
#[utoipa::path(
    post,
    path = "/api/v1/repos/{id}/star",
    params(("id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "New star count", body = StarResponse),
        (status = 404, description = "Unknown repository"),
        (status = 409, description = "Already starred")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn star_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StarResponse>>, ApiError> {
    load_repo(&state, id).await?;
    let stars = state.repos.star(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(StarResponse {
        repo_id: id,
        stars,
    })))
}

/// Remove the caller's star. Idempotent.
#[utoipa::path(
    delete,
    path = "/api/v1/repos/{id}/star",
    params(("id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "New star count", body = StarResponse),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn unstar_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StarResponse>>, ApiError> {
    load_repo(&state, id).await?;
    let stars = state.repos.unstar(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(StarResponse {
        repo_id: id,
        stars,
    })))
}

/// Fork a repository: copy it and its blocks under the caller's ownership
/// and bump the source's fork counter.
#[utoipa::path(
    post,
    path = "/api/v1/repos/{id}/fork",
    params(("id" = Uuid, Path, description = "Source repository id")),
    responses(
        (status = 200, description = "The new fork", body = Repository),
        (status = 403, description = "Source is private"),
        (status = 404, description = "Unknown repository")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn fork_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Repository>>, ApiError> {
    let source = load_repo(&state, id).await?;
    if !can_view(&source, &claims.sub) {
        return Err(ApiError::Forbidden("Repository is private".to_string()));
    }

    let fork = state
        .repos
        .insert(
            &source.name,
            source.description.as_deref(),
            &source.visibility,
            &claims.sub,
        )
        .await?;

    // Copy blocks in canonical order; copies start a fresh review cycle.
    let blocks = state.blocks.list_for_repo(id).await?;
    for block in &blocks {
        state
            .blocks
            .insert(
                fork.id,
                &block.kind,
                block.title.as_deref(),
                block.description.as_deref(),
                &block.content,
                &claims.sub,
            )
            .await?;
    }
    refresh_fingerprint(&state, fork.id).await?;

    state.repos.bump_forks(id).await?;

    let fork = load_repo(&state, fork.id).await?;
    Ok(Json(ApiResponse::success(fork)))
}

/// Anchor the repository's content fingerprint on the ledger. Owner only.
///
/// The fingerprint is recomputed from the current blocks immediately before
/// submission; the response carries the transaction hash as accepted by the
/// node, without waiting for confirmation.
#[utoipa::path(
    post,
    path = "/api/v1/repos/{id}/anchor",
    params(("id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Submitted transaction", body = AnchorResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Unknown repository"),
        (status = 502, description = "Ledger node rejected the transaction"),
        (status = 503, description = "Anchoring disabled or ledger unreachable")
    ),
    security(("bearer_auth" = [])),
    tag = "Repos"
)]
pub async fn anchor_repo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnchorResponse>>, ApiError> {
    let registry = state.registry.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("On-chain anchoring is not configured".to_string())
    })?;

    let repo = load_repo(&state, id).await?;
    require_repo_owner(&repo, &claims.sub)?;

    let hash = refresh_fingerprint(&state, id).await?;

    let tx_hash = registry
        .register(&id.to_string(), &hash, &repo.owner_address)
        .await
        .map_err(|e| match e {
            LedgerError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            LedgerError::TransactionRejected(msg) => ApiError::Upstream(msg),
            LedgerError::LedgerUnavailable(msg) | LedgerError::ContractUnavailable(msg) => {
                ApiError::ServiceUnavailable(msg)
            }
        })?;

    Ok(Json(ApiResponse::success(AnchorResponse {
        repo_id: id,
        hash,
        tx_hash,
    })))
}
