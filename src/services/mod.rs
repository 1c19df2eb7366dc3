//! Collaborator handles injected into the dispatcher.
//!
//! Built once per process (Lambda cold start or server start) and cloned
//! cheaply into each invocation.

use aws_config::BehaviorVersion;
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::storage::dynamodb::{DynamoMusicStore, DynamoSettingsStore};
use crate::storage::s3::S3ObjectStorage;
use crate::storage::{
    MemoryMusicStore, MemoryObjectStorage, MemorySettingsStore, MusicStore, ObjectStorage,
    SettingsStore,
};

#[derive(Clone)]
pub struct Services {
    pub settings: Arc<dyn SettingsStore>,
    pub music: Arc<dyn MusicStore>,
    /// Bucket holding uploaded music files
    pub music_objects: Arc<dyn ObjectStorage>,
    /// Bucket holding profile images, decoded images and their results
    pub image_objects: Arc<dyn ObjectStorage>,
}

impl Services {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        music: Arc<dyn MusicStore>,
        music_objects: Arc<dyn ObjectStorage>,
        image_objects: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            settings,
            music,
            music_objects,
            image_objects,
        }
    }

    /// Construct the backend selected by configuration
    pub async fn from_config(config: &AppConfig) -> Self {
        match config.storage.backend {
            StorageBackend::Aws => Self::aws(config).await,
            StorageBackend::Memory => Self::in_memory(config),
        }
    }

    /// DynamoDB tables and S3 buckets, credentials from the default provider chain
    pub async fn aws(config: &AppConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let dynamodb = aws_sdk_dynamodb::Client::new(&sdk_config);
        let s3 = aws_sdk_s3::Client::new(&sdk_config);
        let storage = &config.storage;

        info!(
            "Using AWS collaborators: tables [{}, {}], buckets [{}, {}]",
            storage.user_settings_table,
            storage.musics_table,
            storage.musics_bucket,
            storage.image_bucket
        );

        Self::new(
            Arc::new(DynamoSettingsStore::new(
                dynamodb.clone(),
                &storage.user_settings_table,
            )),
            Arc::new(DynamoMusicStore::new(dynamodb, &storage.musics_table)),
            Arc::new(S3ObjectStorage::new(s3.clone(), &storage.musics_bucket)),
            Arc::new(S3ObjectStorage::new(s3, &storage.image_bucket)),
        )
    }

    /// Process-local collaborators; state is lost on exit
    pub fn in_memory(config: &AppConfig) -> Self {
        let storage = &config.storage;
        let secret = &config.security.dev_secret;

        info!("Using in-memory collaborators");

        Self::new(
            Arc::new(MemorySettingsStore::new()),
            Arc::new(MemoryMusicStore::new()),
            Arc::new(MemoryObjectStorage::new(&storage.musics_bucket, secret)),
            Arc::new(MemoryObjectStorage::new(&storage.image_bucket, secret)),
        )
    }
}
