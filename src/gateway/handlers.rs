//! HTTP handlers, grouped by resource.

pub mod audits;
pub mod auth;
pub mod blocks;
pub mod health;
pub mod helpers;
pub mod repos;
pub mod users;

pub use audits::{block_audit_webhook, list_audits};
pub use auth::{login, me, request_nonce};
pub use blocks::{
    create_block, delete_asset, delete_block, get_block, list_blocks, update_block, upload_asset,
};
pub use health::{HealthResponse, health_check};
pub use repos::{
    anchor_repo, create_repo, delete_repo, fork_repo, get_repo, list_repos, my_repos, star_repo,
    starred_repos, unstar_repo, update_repo,
};
pub use users::{delete_avatar, get_me, get_user, update_me, upload_avatar};
