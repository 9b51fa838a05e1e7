pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_auth;
use crate::config::GatewayConfig;
use state::AppState;

/// Assemble the full API router.
///
/// Public routes and the secret-authenticated audit webhook are merged with a
/// bearer-protected router; merging is safe because overlapping paths differ
/// in method.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/auth/nonce", post(handlers::request_nonce))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/users/{address}", get(handlers::get_user))
        .route("/api/v1/repos", get(handlers::list_repos))
        .route("/api/v1/blocks/{id}", get(handlers::get_block))
        .route("/api/v1/blocks/repo/{repo_id}", get(handlers::list_blocks))
        // Authenticated by x-webhook-secret, not by bearer token.
        .route(
            "/api/v1/audits/webhook/block-audit",
            post(handlers::block_audit_webhook),
        );

    let protected = Router::new()
        .route("/api/v1/auth/me", get(handlers::me))
        .route(
            "/api/v1/users/me",
            get(handlers::get_me).put(handlers::update_me),
        )
        .route(
            "/api/v1/users/me/avatar",
            post(handlers::upload_avatar).delete(handlers::delete_avatar),
        )
        .route("/api/v1/repos", post(handlers::create_repo))
        .route("/api/v1/repos/mine", get(handlers::my_repos))
        .route("/api/v1/repos/starred", get(handlers::starred_repos))
        .route(
            "/api/v1/repos/{id}",
            get(handlers::get_repo)
                .put(handlers::update_repo)
                .delete(handlers::delete_repo),
        )
        .route(
            "/api/v1/repos/{id}/star",
            post(handlers::star_repo).delete(handlers::unstar_repo),
        )
        .route("/api/v1/repos/{id}/fork", post(handlers::fork_repo))
        .route("/api/v1/repos/{id}/anchor", post(handlers::anchor_repo))
        .route("/api/v1/blocks", post(handlers::create_block))
        .route(
            "/api/v1/blocks/{id}",
            put(handlers::update_block).delete(handlers::delete_block),
        )
        .route(
            "/api/v1/blocks/{id}/assets",
            post(handlers::upload_asset).delete(handlers::delete_asset),
        )
        .route("/api/v1/audits/repos/{repo_id}", get(handlers::list_audits))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}

/// Start the HTTP gateway server. Blocks until the server exits.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) {
    let mut app = build_router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    if config.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                config.port, config.port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
