//! Outbound AI audit submissions.
//!
//! Newly created blocks are POSTed to the external analysis service from a
//! spawned task; the verdict comes back later through the inbound webhook.
//! Failures here are logged and swallowed — the block write has already
//! succeeded and the audit is a best-effort side effect.

use serde::Serialize;
use uuid::Uuid;

use crate::models::Block;

#[derive(Debug, Serialize)]
struct BlockAnalysisRequest {
    block_id: Uuid,
    repo_id: Uuid,
    description: Option<String>,
    content: serde_json::Value,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Clone)]
pub struct AiAuditClient {
    http: reqwest::Client,
    analysis_url: String,
}

impl AiAuditClient {
    pub fn new(analysis_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            analysis_url,
        }
    }

    /// Submit a block for analysis without blocking the request that
    /// triggered it.
    pub fn spawn_submit(&self, block: &Block) {
        let payload = BlockAnalysisRequest {
            block_id: block.id,
            repo_id: block.repo_id,
            description: block.description.clone(),
            content: block.content.clone(),
            kind: block.kind.clone(),
        };
        let http = self.http.clone();
        let url = self.analysis_url.clone();

        tokio::spawn(async move {
            let block_id = payload.block_id;
            match http.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!("block {} submitted for AI analysis", block_id);
                }
                Ok(resp) => {
                    tracing::error!(
                        "AI analysis submission for block {} returned {}",
                        block_id,
                        resp.status()
                    );
                }
                Err(e) => {
                    tracing::error!("AI analysis submission for block {} failed: {}", block_id, e);
                }
            }
        });
    }
}
