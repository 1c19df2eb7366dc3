use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::api::request::{body_string, ApiRequest};
use crate::api::response::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::services::Services;
use crate::storage::{presigned_url, MusicRecord, ObjectStorage, StorageError};

const MUSIC_PREFIX: &str = "musics/";
const MUSIC_CONTENT_TYPE: &str = "audio/*";

/// Track as returned to clients, with a fresh download link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicView {
    pub music_id: String,
    pub title: String,
    pub s3_key: String,
    pub user_id: String,
    pub presigned_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicList {
    pub music_list: Vec<MusicView>,
}

/// `musics/<title>_<music_id>.<extension>`
pub fn music_key(title: &str, music_id: &str, extension: &str) -> String {
    format!("{}{}_{}.{}", MUSIC_PREFIX, title, music_id, extension)
}

async fn to_view(storage: &dyn ObjectStorage, record: MusicRecord) -> Result<MusicView, StorageError> {
    let presigned_url = presigned_url(storage, &record.s3_key).await?;
    Ok(MusicView {
        music_id: record.music_id,
        title: record.title,
        s3_key: record.s3_key,
        user_id: record.user_id,
        presigned_url,
    })
}

fn music_id_param(request: &ApiRequest) -> Result<&str, ApiError> {
    request
        .query_param("music_id")
        .ok_or_else(|| ApiError::required("Music ID is required"))
}

/// GET /music/list
pub async fn list(services: &Services, _request: &ApiRequest) -> ApiResult<MusicList> {
    let records = services.music.scan().await?;

    let mut music_list = Vec::with_capacity(records.len());
    for record in records {
        music_list.push(to_view(services.music_objects.as_ref(), record).await?);
    }

    Ok(ApiResponse::success(
        "Music list retrieved successfully",
        MusicList { music_list },
    ))
}

/// GET /music?music_id=<id>
pub async fn get(services: &Services, request: &ApiRequest) -> ApiResult<MusicView> {
    let music_id = music_id_param(request)?;
    let record = services
        .music
        .get(music_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Music not found"))?;

    let view = to_view(services.music_objects.as_ref(), record).await?;
    Ok(ApiResponse::success("Music retrieved successfully", view))
}

/// POST /music - body `{ "music": "<base64>", "title": "...", "extension": "mp3" }`
pub async fn post(services: &Services, request: &ApiRequest) -> ApiResult<MusicRecord> {
    let identity = request.require_identity()?;
    let body = request.json_body()?;

    let encoded = body_string(&body, "music")?
        .ok_or_else(|| ApiError::required("Music data is required"))?;
    let title = body_string(&body, "title")?
        .ok_or_else(|| ApiError::required("Title is required"))?;
    let extension = body_string(&body, "extension")?
        .ok_or_else(|| ApiError::required("Extension is required"))?;
    let data = STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::bad_request("Music data must be base64-encoded"))?;

    let music_id = Uuid::new_v4().to_string();
    let record = MusicRecord {
        s3_key: music_key(title, &music_id, extension),
        music_id,
        title: title.to_string(),
        user_id: identity.user_id.clone(),
        created_at: Utc::now().to_rfc3339(),
    };

    let stored: Result<(), StorageError> = async {
        services
            .music_objects
            .put_object(&record.s3_key, data, MUSIC_CONTENT_TYPE)
            .await?;
        services.music.put(&record).await
    }
    .await;
    stored.map_err(|e| ApiError::collaborator(format!("Failed to upload music, error: {}", e)))?;

    info!("Uploaded music {} as {}", record.music_id, record.s3_key);
    Ok(ApiResponse::success("Music uploaded successfully", record))
}

/// DELETE /music?music_id=<id>
pub async fn delete(services: &Services, request: &ApiRequest) -> ApiResult<Value> {
    request.require_identity()?;
    let music_id = music_id_param(request)?;

    let record = services
        .music
        .get(music_id)
        .await
        .map_err(|e| ApiError::collaborator(format!("Failed to delete music, error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Music not found"))?;

    let deleted: Result<(), StorageError> = async {
        services.music_objects.delete_object(&record.s3_key).await?;
        services.music.delete(&record.music_id).await
    }
    .await;
    deleted.map_err(|e| ApiError::collaborator(format!("Failed to delete music, error: {}", e)))?;

    info!("Deleted music {}", record.music_id);
    Ok(ApiResponse::message_only("Music deleted successfully"))
}
