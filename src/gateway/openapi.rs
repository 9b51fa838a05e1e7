//! OpenAPI / Swagger UI Documentation
//!
//! Auto-generated OpenAPI 3.0 documentation for the Infinita Science Hub API.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers;
use crate::models::{AuditLogEntry, Block, Collaborator, Repository, UserProfile};

/// Bearer JWT security scheme (wallet challenge-response login).
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "HS256 session token from POST /api/v1/auth/login. \
                             Obtain a challenge with POST /api/v1/auth/nonce, sign it \
                             with the wallet, and exchange the signature for a token.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Infinita Science Hub API",
        version = "1.0.0",
        description = "Collaborative science repository platform: wallet-signature auth, \
                       content blocks with AI audit, and on-chain content-hash anchoring.",
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::request_nonce,
        handlers::auth::login,
        handlers::auth::me,
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::upload_avatar,
        handlers::users::delete_avatar,
        handlers::users::get_user,
        handlers::repos::create_repo,
        handlers::repos::list_repos,
        handlers::repos::my_repos,
        handlers::repos::starred_repos,
        handlers::repos::get_repo,
        handlers::repos::update_repo,
        handlers::repos::delete_repo,
        handlers::repos::star_repo,
        handlers::repos::unstar_repo,
        handlers::repos::fork_repo,
        handlers::repos::anchor_repo,
        handlers::blocks::create_block,
        handlers::blocks::get_block,
        handlers::blocks::list_blocks,
        handlers::blocks::update_block,
        handlers::blocks::delete_block,
        handlers::blocks::upload_asset,
        handlers::blocks::delete_asset,
        handlers::audits::block_audit_webhook,
        handlers::audits::list_audits,
    ),
    components(schemas(
        UserProfile,
        Repository,
        Collaborator,
        Block,
        AuditLogEntry,
        handlers::health::HealthResponse,
        handlers::auth::NonceRequest,
        handlers::auth::NonceResponse,
        handlers::auth::LoginRequest,
        handlers::auth::LoginResponse,
        handlers::auth::SessionInfo,
        handlers::users::UpdateProfileRequest,
        handlers::repos::CreateRepoRequest,
        handlers::repos::UpdateRepoRequest,
        handlers::repos::StarResponse,
        handlers::repos::AnchorResponse,
        handlers::blocks::CreateBlockRequest,
        handlers::blocks::UpdateBlockRequest,
        handlers::blocks::AssetResponse,
        handlers::audits::AuditWebhookPayload,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health and diagnostics"),
        (name = "Auth", description = "Wallet challenge-response authentication"),
        (name = "Users", description = "Profiles and avatars"),
        (name = "Repos", description = "Science repositories"),
        (name = "Blocks", description = "Content blocks"),
        (name = "Audits", description = "AI audit webhook and history"),
    )
)]
pub struct ApiDoc;
