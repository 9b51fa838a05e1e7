//! User profile handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::ApiResponse;
use super::helpers::{read_upload, require_storage};
use crate::auth::{Claims, normalize_address};
use crate::db::ProfilePatch;
use crate::error::ApiError;
use crate::models::UserProfile;
use crate::storage::BlobStore;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 280))]
    pub bio: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No profile row for this address")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state
        .users
        .get_by_address(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Update the current user's profile. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let patch = ProfilePatch {
        username: req.username,
        email: req.email,
        bio: req.bio,
        description: req.description,
    };
    let profile = state.users.upsert_profile(&claims.sub, &patch).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Upload a profile image. The previous image, if any, is removed from the
/// blob store on a best-effort basis.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/avatar",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile with new image URL", body = UserProfile),
        (status = 400, description = "No file in the multipart body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Blob store not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let storage = require_storage(&state)?;
    let upload = read_upload(multipart).await?;

    // Drop the previous object so orphans do not pile up.
    if let Some(profile) = state.users.get_by_address(&claims.sub).await?
        && let Some(old_url) = profile.profile_image_url
    {
        delete_object_best_effort(storage, &old_url).await;
    }

    let key = BlobStore::object_key("avatars", &claims.sub, &upload.filename);
    storage
        .put(&key, upload.bytes, &upload.content_type)
        .await?;
    let url = storage
        .url_for(&key)
        .await?;

    let profile = state.users.set_avatar_url(&claims.sub, Some(&url)).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Remove the current user's profile image.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/avatar",
    responses(
        (status = 200, description = "Profile without image", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Blob store not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_avatar(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let storage = require_storage(&state)?;

    if let Some(profile) = state.users.get_by_address(&claims.sub).await?
        && let Some(old_url) = profile.profile_image_url
    {
        delete_object_best_effort(storage, &old_url).await;
    }

    let profile = state.users.set_avatar_url(&claims.sub, None).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Public profile lookup by wallet address.
#[utoipa::path(
    get,
    path = "/api/v1/users/{address}",
    params(("address" = String, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 400, description = "Malformed wallet address"),
        (status = 404, description = "Unknown address")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let address = normalize_address(&address)
        .map_err(|_| ApiError::InvalidInput("Malformed wallet address".to_string()))?;
    let profile = state
        .users
        .get_by_address(&address)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(ApiResponse::success(profile)))
}

async fn delete_object_best_effort(storage: &BlobStore, url: &str) {
    if let Some(key) = storage.key_from_url(url) {
        if let Err(e) = storage.delete(&key).await {
            tracing::warn!("failed to delete blob {}: {}", key, e);
        }
    }
}
