use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::debug;

use super::{MusicRecord, MusicStore, SettingsRecord, SettingsStore, SettingsUpdate, StorageError};

type Item = HashMap<String, AttributeValue>;

fn backend_error<E: std::error::Error + 'static>(err: E) -> StorageError {
    StorageError::Backend(DisplayErrorContext(err).to_string())
}

fn string_attr(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|value| value.as_s().ok()).cloned()
}

fn string_value(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// Settings table with hash key `user_id`
#[derive(Debug, Clone)]
pub struct DynamoSettingsStore {
    client: Client,
    table: String,
}

impl DynamoSettingsStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl SettingsStore for DynamoSettingsStore {
    async fn get(&self, user_id: &str) -> Result<Option<SettingsRecord>, StorageError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("user_id", string_value(user_id))
            .send()
            .await
            .map_err(backend_error)?;

        Ok(output.item().map(|item| SettingsRecord {
            user_id: user_id.to_string(),
            username: string_attr(item, "username"),
            email: string_attr(item, "email"),
            music_id: string_attr(item, "music_id"),
        }))
    }

    async fn update(&self, user_id: &str, update: &SettingsUpdate) -> Result<(), StorageError> {
        debug!("Updating settings for {} in {}", user_id, self.table);
        self.client
            .update_item()
            .table_name(&self.table)
            .key("user_id", string_value(user_id))
            .update_expression("SET username = :username, email = :email, music_id = :music_id")
            .expression_attribute_values(":username", string_value(&update.username))
            .expression_attribute_values(":email", string_value(&update.email))
            .expression_attribute_values(":music_id", string_value(&update.music_id))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

/// Music table with hash key `music_id`
#[derive(Debug, Clone)]
pub struct DynamoMusicStore {
    client: Client,
    table: String,
}

impl DynamoMusicStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn record_from_item(item: &Item) -> Result<MusicRecord, StorageError> {
        let music_id = string_attr(item, "music_id")
            .ok_or_else(|| StorageError::MalformedRecord("music item without music_id".into()))?;
        Ok(MusicRecord {
            music_id,
            title: string_attr(item, "title").unwrap_or_default(),
            s3_key: string_attr(item, "s3_key").unwrap_or_default(),
            user_id: string_attr(item, "user_id").unwrap_or_default(),
            created_at: string_attr(item, "created_at").unwrap_or_default(),
        })
    }
}

#[async_trait]
impl MusicStore for DynamoMusicStore {
    async fn get(&self, music_id: &str) -> Result<Option<MusicRecord>, StorageError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("music_id", string_value(music_id))
            .send()
            .await
            .map_err(backend_error)?;

        output.item().map(Self::record_from_item).transpose()
    }

    async fn put(&self, record: &MusicRecord) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("music_id", string_value(&record.music_id))
            .item("title", string_value(&record.title))
            .item("s3_key", string_value(&record.s3_key))
            .item("user_id", string_value(&record.user_id))
            .item("created_at", string_value(&record.created_at))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<MusicRecord>, StorageError> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend_error)?;

            for item in output.items() {
                records.push(Self::record_from_item(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn delete(&self, music_id: &str) -> Result<(), StorageError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("music_id", string_value(music_id))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_item_defaults_missing_attributes() {
        let mut item = Item::new();
        item.insert("music_id".into(), string_value("m1"));
        item.insert("title".into(), string_value("Song A"));

        let record = DynamoMusicStore::record_from_item(&item).unwrap();
        assert_eq!(record.music_id, "m1");
        assert_eq!(record.title, "Song A");
        assert_eq!(record.s3_key, "");
    }

    #[test]
    fn record_without_id_is_malformed() {
        let item = Item::new();
        let err = DynamoMusicStore::record_from_item(&item).unwrap_err();
        assert!(matches!(err, StorageError::MalformedRecord(_)));
    }

    #[test]
    fn non_string_attributes_are_ignored() {
        let mut item = Item::new();
        item.insert("username".into(), AttributeValue::N("7".into()));
        assert_eq!(string_attr(&item, "username"), None);
    }
}
