//! Collaborator contracts for the key-value record store and object storage.
//!
//! Handlers only ever talk to these traits. Two families of implementations
//! exist: AWS-backed (`dynamodb`, `s3`) for deployed functions and in-memory
//! (`memory`) for the local server and tests.

pub mod dynamodb;
pub mod memory;
pub mod models;
pub mod s3;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use memory::{MemoryMusicStore, MemoryObjectStorage, MemorySettingsStore};
pub use models::{MusicRecord, ObjectSummary, SettingsRecord, SettingsUpdate};

/// Validity horizon of every presigned download link
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Errors returned by collaborator calls
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Per-user settings table keyed by `user_id`
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<SettingsRecord>, StorageError>;

    /// Field-level overwrite; creates the record when absent
    async fn update(&self, user_id: &str, update: &SettingsUpdate) -> Result<(), StorageError>;
}

/// Music metadata table keyed by `music_id`
#[async_trait]
pub trait MusicStore: Send + Sync {
    async fn get(&self, music_id: &str) -> Result<Option<MusicRecord>, StorageError>;
    async fn put(&self, record: &MusicRecord) -> Result<(), StorageError>;
    async fn scan(&self) -> Result<Vec<MusicRecord>, StorageError>;
    async fn delete(&self, music_id: &str) -> Result<(), StorageError>;
}

/// A single bucket of object storage
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn bucket(&self) -> &str;

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Returns `StorageError::NotFound` when the key does not exist
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn head_object(&self, key: &str) -> Result<bool, StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// All objects under `prefix`, in backend order
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StorageError>;

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Time-bounded download link for `key`, or `None` when there is no key.
pub async fn presigned_url(
    storage: &dyn ObjectStorage,
    key: &str,
) -> Result<Option<String>, StorageError> {
    if key.is_empty() {
        return Ok(None);
    }
    storage.presign_get(key, PRESIGNED_URL_TTL).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_key_has_no_link() {
        let storage = MemoryObjectStorage::new("bucket", "secret");
        assert_eq!(presigned_url(&storage, "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn link_expires_after_an_hour() {
        let storage = MemoryObjectStorage::new("bucket", "secret");
        let url = presigned_url(&storage, "roles/alice.jpg").await.unwrap().unwrap();
        assert!(url.contains("X-Amz-Expires=3600"), "{url}");
    }
}
