use std::sync::Arc;

use crate::ai_audit::AiAuditClient;
use crate::auth::AuthService;
use crate::db::{AuditStore, BlockStore, Database, RepoStore, UserStore};
use crate::ledger::RegistryClient;
use crate::storage::BlobStore;

/// Shared gateway application state.
///
/// Optional collaborators (`registry`, `storage`, `ai`) are `None` when the
/// feature is unconfigured or failed at startup; the routes that need them
/// answer 503 while everything else keeps working.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: UserStore,
    pub repos: RepoStore,
    pub blocks: BlockStore,
    pub audits: AuditStore,
    pub auth: AuthService,
    pub registry: Option<Arc<RegistryClient>>,
    pub storage: Option<BlobStore>,
    pub ai: Option<AiAuditClient>,
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(
        db: Database,
        auth: AuthService,
        registry: Option<Arc<RegistryClient>>,
        storage: Option<BlobStore>,
        ai: Option<AiAuditClient>,
        webhook_secret: Option<String>,
    ) -> Self {
        let pool = db.pool().clone();
        Self {
            db,
            users: UserStore::new(pool.clone()),
            repos: RepoStore::new(pool.clone()),
            blocks: BlockStore::new(pool.clone()),
            audits: AuditStore::new(pool),
            auth,
            registry,
            storage,
            ai,
            webhook_secret,
        }
    }
}
