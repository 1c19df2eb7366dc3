use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::api::request::{body_string, ApiRequest};
use crate::api::response::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::services::Services;
use crate::storage::SettingsUpdate;

fn required_field(body: &Map<String, Value>, field: &str) -> Result<String, ApiError> {
    body_string(body, field)?
        .map(str::to_string)
        .ok_or_else(|| ApiError::missing_field(field))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub username: Option<String>,
    pub email: Option<String>,
    pub music_id: Option<String>,
}

/// GET /user/settings
///
/// Stored attributes win. Attributes never written fall back to the caller's
/// claims, so a first-time user sees their identity provider profile.
pub async fn get(services: &Services, request: &ApiRequest) -> ApiResult<SettingsView> {
    let identity = request.require_identity()?;
    let record = services.settings.get(&identity.user_id).await?;

    let (username, email, music_id) = match record {
        Some(record) => (record.username, record.email, record.music_id),
        None => (None, None, None),
    };

    Ok(ApiResponse::success(
        "User settings retrieved successfully",
        SettingsView {
            username: username.or_else(|| identity.username.clone()),
            email: email.or_else(|| identity.email.clone()),
            music_id,
        },
    ))
}

/// PUT /user/settings - overwrite username, email and linked music id
pub async fn put(services: &Services, request: &ApiRequest) -> ApiResult<SettingsView> {
    let identity = request.require_identity()?;
    let body = request.json_body()?;

    let update = SettingsUpdate {
        username: required_field(&body, "username")?,
        email: required_field(&body, "email")?,
        music_id: required_field(&body, "music_id")?,
    };
    services.settings.update(&identity.user_id, &update).await?;
    info!("Updated settings for {}", identity.user_id);

    Ok(ApiResponse::success(
        "User settings updated successfully",
        SettingsView {
            username: Some(update.username),
            email: Some(update.email),
            music_id: Some(update.music_id),
        },
    ))
}
