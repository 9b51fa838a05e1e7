//! Infinita Science Hub - service entry point.
//!
//! Boot order: config, logging, Postgres pool, auth service, then the
//! optional collaborators (ledger registry, blob store, AI audit client).
//! A misconfigured collaborator disables its feature; it never takes the
//! rest of the service down.

use std::sync::Arc;

use infinita_hub::auth::AuthService;
use infinita_hub::config::AppConfig;
use infinita_hub::db::{Database, UserStore};
use infinita_hub::gateway::state::AppState;
use infinita_hub::{SessionIssuer, ai_audit::AiAuditClient, ledger::RegistryClient};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = infinita_hub::logging::init_logging(&app_config);

    tracing::info!("Starting Infinita Science Hub in {} mode", env);
    println!(
        "=== Infinita Science Hub ({}) [build {}] ===",
        env,
        env!("GIT_HASH")
    );

    println!("\n[1] Connecting to PostgreSQL...");
    let db = Database::connect(
        &app_config.database.url,
        app_config.database.max_connections,
    )
    .await?;
    db.health_check().await?;
    println!("✅ PostgreSQL connected");

    let auth = AuthService::new(
        UserStore::new(db.pool().clone()),
        SessionIssuer::new(
            app_config.auth.jwt_secret.clone(),
            app_config.auth.jwt_ttl_secs,
        ),
        app_config.auth.nonce_ttl_secs,
    );

    println!("\n[2] Initializing collaborators...");
    let registry = if app_config.ledger.enabled {
        match RegistryClient::new(&app_config.ledger) {
            Ok(client) => {
                println!("✅ Ledger registry client ready");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("ledger registry disabled: {}", e);
                eprintln!("⚠️  Ledger registry disabled: {}", e);
                None
            }
        }
    } else {
        println!("[Ledger] Disabled");
        None
    };

    let storage = if app_config.storage.enabled {
        println!("✅ Blob store client ready");
        Some(infinita_hub::storage::BlobStore::new(&app_config.storage))
    } else {
        println!("[Storage] Disabled");
        None
    };

    let ai = if app_config.ai_audit.enabled {
        println!("✅ AI audit client ready");
        Some(AiAuditClient::new(app_config.ai_audit.analysis_url.clone()))
    } else {
        println!("[AI Audit] Disabled");
        None
    };

    let webhook_secret = app_config.ai_audit.webhook_secret.clone();
    if webhook_secret.is_none() {
        tracing::warn!("audit webhook secret unset, webhook callbacks will be refused");
    }

    let state = Arc::new(AppState::new(
        db,
        auth,
        registry,
        storage,
        ai,
        webhook_secret,
    ));

    infinita_hub::gateway::run_server(&app_config.gateway, state).await;
    Ok(())
}
