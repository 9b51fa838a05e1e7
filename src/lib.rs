//! Infinita Science Hub - Collaborative Science Repository Backend
//!
//! Wallet-signature authentication, repositories of content blocks, AI audit
//! webhooks, and on-chain content-hash anchoring.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with env-var secret overrides
//! - [`logging`] - tracing subscriber setup (rolling files, optional JSON)
//! - [`error`] - HTTP error taxonomy
//! - [`models`] - Persistent record types
//! - [`db`] - PostgreSQL stores (users, repos, blocks, audit logs)
//! - [`auth`] - Challenge-response wallet auth (nonce, signature, JWT)
//! - [`fingerprint`] - Deterministic repository content fingerprints
//! - [`ledger`] - On-chain registry contract client
//! - [`storage`] - Blob store REST client
//! - [`ai_audit`] - Outbound AI analysis submissions
//! - [`gateway`] - Axum HTTP surface

pub mod ai_audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod storage;

// Convenient re-exports at crate root
pub use auth::{AuthService, Claims, SessionIssuer};
pub use config::AppConfig;
pub use db::Database;
pub use error::ApiError;
pub use models::{AuditLogEntry, Block, BlockStatus, Collaborator, Repository, UserProfile};
