//! services/api/src/adapters/storage.rs
//!
//! This module contains the object-storage adapter, which is the concrete
//! implementation of the `DocumentStorage` port. It speaks the Supabase
//! Storage REST API over `reqwest`; the service itself never touches disk.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use docuchat_core::ports::{BucketStatus, DocumentStorage, PortError, PortResult, StoredObject};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

/// Maximum stored object size accepted by the bucket (50 MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 52_428_800;

/// Media types the bucket accepts on upload.
const ALLOWED_MIME_TYPES: [&str; 5] = [
    "text/plain",
    "text/markdown",
    "application/pdf",
    "application/json",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `DocumentStorage` port against a
/// Supabase-compatible Storage REST endpoint.
#[derive(Clone)]
pub struct StorageAdapter {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl StorageAdapter {
    /// Creates a new `StorageAdapter` for the project at `base_url`
    /// (e.g. `https://xyz.supabase.co`).
    pub fn new(base_url: &str, service_key: String, bucket: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    /// Collapses a reqwest failure or non-success response into a `PortError`
    /// carrying the status and response body.
    async fn check(
        response: Result<reqwest::Response, reqwest::Error>,
        action: &str,
    ) -> PortResult<reqwest::Response> {
        let response =
            response.map_err(|e| PortError::Unexpected(format!("{}: {}", action, e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PortError::Unexpected(format!(
            "{}: storage service returned {}: {}",
            action, status, body
        )))
    }
}

//=========================================================================================
// Storage Listing Payloads
//=========================================================================================

#[derive(Deserialize)]
struct ObjectEntry {
    name: String,
    // Folder placeholders come back with a null id.
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    metadata: Option<ObjectMetadata>,
}

#[derive(Deserialize)]
struct ObjectMetadata {
    size: Option<i64>,
    mimetype: Option<String>,
}

impl ObjectEntry {
    fn to_domain(self) -> Option<StoredObject> {
        let id = self.id?;
        let (size, media_type) = match self.metadata {
            Some(meta) => (meta.size, meta.mimetype),
            None => (None, None),
        };
        Some(StoredObject {
            id,
            name: self.name,
            media_type,
            size,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DocumentStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStorage for StorageAdapter {
    async fn create_bucket(&self) -> PortResult<BucketStatus> {
        let body = json!({
            "id": self.bucket,
            "name": self.bucket,
            "public": true,
            "file_size_limit": MAX_FILE_SIZE_BYTES,
            "allowed_mime_types": ALLOWED_MIME_TYPES,
        });

        let response = self
            .authed(self.client.post(self.storage_url("bucket")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("create bucket: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(BucketStatus::Created);
        }

        // An existing bucket is the idempotent success case.
        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || text.to_lowercase().contains("already exists") {
            return Ok(BucketStatus::AlreadyExists);
        }
        Err(PortError::Unexpected(format!(
            "create bucket: storage service returned {}: {}",
            status, text
        )))
    }

    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> PortResult<()> {
        let url = self.storage_url(&format!("object/{}/{}", self.bucket, path));
        let response = self
            .authed(self.client.post(&url))
            .header("content-type", content_type.to_string())
            .header("x-upsert", "false")
            .body(Bytes::copy_from_slice(bytes))
            .send()
            .await;
        Self::check(response, "upload object").await?;
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<StoredObject>> {
        let url = self.storage_url(&format!("object/list/{}", self.bucket));
        let response = self
            .authed(self.client.post(&url))
            .json(&json!({ "prefix": "", "limit": 1000, "offset": 0 }))
            .send()
            .await;
        let entries: Vec<ObjectEntry> = Self::check(response, "list objects")
            .await?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("list objects: {}", e)))?;

        Ok(entries
            .into_iter()
            .filter_map(ObjectEntry::to_domain)
            .collect())
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        let url = self.storage_url(&format!("object/{}", self.bucket));
        let response = self
            .authed(self.client.delete(&url))
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await;
        Self::check(response, "remove object").await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_is_pure_string_construction() {
        let adapter = StorageAdapter::new(
            "https://example.supabase.co/",
            "key".to_string(),
            "documents".to_string(),
        );
        assert_eq!(
            adapter.public_url("abc-report.txt"),
            "https://example.supabase.co/storage/v1/object/public/documents/abc-report.txt"
        );
    }

    #[test]
    fn folder_entries_are_dropped_from_listings() {
        let file = ObjectEntry {
            name: "a.txt".to_string(),
            id: Some("obj-1".to_string()),
            created_at: None,
            metadata: Some(ObjectMetadata {
                size: Some(11),
                mimetype: Some("text/plain".to_string()),
            }),
        };
        let folder = ObjectEntry {
            name: "subdir".to_string(),
            id: None,
            created_at: None,
            metadata: None,
        };

        assert!(file.to_domain().is_some());
        assert!(folder.to_domain().is_none());
    }
}
