use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::{
    MusicRecord, MusicStore, ObjectStorage, ObjectSummary, SettingsRecord, SettingsStore,
    SettingsUpdate, StorageError,
};

/// In-process settings table
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    items: Arc<RwLock<HashMap<String, SettingsRecord>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Seed a record as-is, bypassing the update path
    pub async fn insert(&self, record: SettingsRecord) {
        self.items.write().await.insert(record.user_id.clone(), record);
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, user_id: &str) -> Result<Option<SettingsRecord>, StorageError> {
        Ok(self.items.read().await.get(user_id).cloned())
    }

    async fn update(&self, user_id: &str, update: &SettingsUpdate) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        let record = items.entry(user_id.to_string()).or_insert_with(|| SettingsRecord {
            user_id: user_id.to_string(),
            ..SettingsRecord::default()
        });
        record.username = Some(update.username.clone());
        record.email = Some(update.email.clone());
        record.music_id = Some(update.music_id.clone());
        Ok(())
    }
}

/// In-process music table. Scans return records ordered by `music_id`.
#[derive(Debug, Clone, Default)]
pub struct MemoryMusicStore {
    items: Arc<RwLock<BTreeMap<String, MusicRecord>>>,
}

impl MemoryMusicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MusicStore for MemoryMusicStore {
    async fn get(&self, music_id: &str) -> Result<Option<MusicRecord>, StorageError> {
        Ok(self.items.read().await.get(music_id).cloned())
    }

    async fn put(&self, record: &MusicRecord) -> Result<(), StorageError> {
        self.items
            .write()
            .await
            .insert(record.music_id.clone(), record.clone());
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<MusicRecord>, StorageError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn delete(&self, music_id: &str) -> Result<(), StorageError> {
        self.items.write().await.remove(music_id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// In-process bucket. Presigned links carry a SHA-256 digest of the signing
/// secret, bucket, key and expiry.
#[derive(Debug, Clone)]
pub struct MemoryObjectStorage {
    bucket: String,
    signing_secret: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStorage {
    pub fn new(bucket: impl Into<String>, signing_secret: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            signing_secret: signing_secret.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Seed an object with an explicit modification time
    pub async fn insert_at(&self, key: &str, data: Vec<u8>, last_modified: DateTime<Utc>) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: "application/octet-stream".to_string(),
                last_modified,
            },
        );
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.content_type.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Base location every presigned link points into
    pub fn base_url(&self) -> String {
        format!("https://{}.s3.local/", self.bucket)
    }

    fn signature(&self, key: &str, expires_secs: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_secret.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.bucket.as_bytes());
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires_secs.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head_object(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StorageError> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let expires_secs = expires_in.as_secs();
        let invalid = || StorageError::InvalidKey(key.to_string());
        let mut url = Url::parse(&self.base_url()).map_err(|_| invalid())?;
        // Each key segment is percent-encoded so `#` and `?` stay part of the path
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(key.split('/'));
        url.query_pairs_mut()
            .append_pair("X-Amz-Expires", &expires_secs.to_string())
            .append_pair("X-Amz-Signature", &self.signature(key, expires_secs));
        Ok(url.to_string())
    }
}
