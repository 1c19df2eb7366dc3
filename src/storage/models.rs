use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user settings. Attributes may be absent on old records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub music_id: Option<String>,
}

/// Full overwrite of the writable settings fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub username: String,
    pub email: String,
    pub music_id: String,
}

/// Stored music track metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicRecord {
    pub music_id: String,
    pub title: String,
    pub s3_key: String,
    pub user_id: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

/// One entry of an object listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

impl ObjectSummary {
    /// Folder placeholders end in a slash and carry no content
    pub fn is_directory(&self) -> bool {
        self.key.ends_with('/')
    }
}
