//! Blob store client (Supabase-style storage REST API).
//!
//! The service proxies uploads for avatars and block assets; the store is an
//! external collaborator reached over HTTP. Public buckets hand out static
//! URLs, private buckets get time-limited signed URLs.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob store unreachable: {0}")]
    Unavailable(String),
    #[error("blob store rejected the request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Unavailable(e.to_string())
        } else {
            Self::Rejected(e.to_string())
        }
    }
}

#[derive(Clone)]
pub struct BlobStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
    public_bucket: bool,
    signed_url_ttl_secs: u64,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl BlobStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
            public_bucket: config.public_bucket,
            signed_url_ttl_secs: config.signed_url_ttl_secs,
        }
    }

    /// Object key for an uploaded file: `<folder>/<owner id>/<uuid>.<ext>`.
    pub fn object_key(folder: &str, owner: &str, filename: &str) -> String {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        format!("{}/{}/{}.{}", folder, owner, Uuid::new_v4(), ext)
    }

    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("content-type", content_type.to_string())
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StorageError::Rejected(format!(
                "upload returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Browsable URL for a stored object. Public buckets need no request;
    /// private buckets ask the store to sign one.
    pub async fn url_for(&self, key: &str) -> Result<String, StorageError> {
        if self.public_bucket {
            return Ok(format!(
                "{}/storage/v1/object/public/{}/{}",
                self.base_url, self.bucket, key
            ));
        }

        let sign_url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, key
        );
        let resp = self
            .http
            .post(&sign_url)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "expiresIn": self.signed_url_ttl_secs }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StorageError::Rejected(format!(
                "sign returned {}",
                resp.status()
            )));
        }

        let signed: SignedUrlResponse = resp.json().await?;
        Ok(self.absolute(&signed.signed_url))
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);
        let resp = self
            .http
            .delete(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StorageError::Rejected(format!(
                "delete returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Extract the object key from a public or signed URL previously handed
    /// out by this store. Returns `None` for foreign URLs.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let path = url
            .split_once("/storage/v1/object/")
            .map(|(_, rest)| rest)?;
        let rest = path
            .strip_prefix("public/")
            .or_else(|| path.strip_prefix("sign/"))?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket != self.bucket || key.is_empty() {
            return None;
        }
        let key = key.split('?').next()?;
        Some(key.to_string())
    }

    fn absolute(&self, maybe_relative: &str) -> String {
        if maybe_relative.starts_with('/') {
            format!("{}{}", self.base_url, maybe_relative)
        } else {
            maybe_relative.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BlobStore {
        BlobStore::new(&StorageConfig {
            enabled: true,
            base_url: "https://proj.supabase.co/".to_string(),
            service_key: "key".to_string(),
            bucket: "hub".to_string(),
            public_bucket: true,
            signed_url_ttl_secs: 3600,
        })
    }

    #[test]
    fn test_object_key_shape() {
        let key = BlobStore::object_key("blocks", "abc", "photo.PNG");
        assert!(key.starts_with("blocks/abc/"));
        assert!(key.ends_with(".png"));

        let no_ext = BlobStore::object_key("avatars", "abc", "file");
        assert!(no_ext.ends_with(".bin"));
    }

    #[test]
    fn test_key_from_public_url() {
        let store = store();
        let key = store
            .key_from_url("https://proj.supabase.co/storage/v1/object/public/hub/blocks/1/x.png")
            .unwrap();
        assert_eq!(key, "blocks/1/x.png");
    }

    #[test]
    fn test_key_from_signed_url_strips_token() {
        let store = store();
        let key = store
            .key_from_url("/storage/v1/object/sign/hub/blocks/1/x.png?token=abc")
            .unwrap();
        assert_eq!(key, "blocks/1/x.png");
    }

    #[test]
    fn test_key_from_foreign_url() {
        let store = store();
        assert!(store.key_from_url("https://elsewhere.example/file.png").is_none());
        assert!(
            store
                .key_from_url("https://proj.supabase.co/storage/v1/object/public/other/x.png")
                .is_none()
        );
    }
}
