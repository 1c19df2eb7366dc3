use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::info;

use crate::api::request::{body_string, ApiRequest};
use crate::api::response::{ApiResponse, ApiResult};
use crate::auth::Identity;
use crate::error::ApiError;
use crate::services::Services;
use crate::storage::presigned_url;

const PROFILE_IMAGE_PREFIX: &str = "roles/";
const PROFILE_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub image_url: Option<String>,
}

/// Storage key of a user's profile image
pub fn profile_image_key(identity: &Identity) -> String {
    format!("{}{}.jpg", PROFILE_IMAGE_PREFIX, identity.display_name())
}

/// GET /user/image
pub async fn get(services: &Services, request: &ApiRequest) -> ApiResult<ImageView> {
    let identity = request.require_identity()?;
    let key = profile_image_key(identity);

    if !services.image_objects.head_object(&key).await? {
        return Err(ApiError::not_found("Profile image not found"));
    }

    let image_url = presigned_url(services.image_objects.as_ref(), &key).await?;
    Ok(ApiResponse::success(
        "User image retrieved successfully",
        ImageView { image_url },
    ))
}

/// POST /user/image - body `{ "image": "<base64 jpeg>" }`
pub async fn post(services: &Services, request: &ApiRequest) -> ApiResult<ImageView> {
    let identity = request.require_identity()?;
    let body = request.json_body()?;

    let encoded = body_string(&body, "image")?
        .ok_or_else(|| ApiError::required("Image data is required"))?;
    let data = STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::bad_request("Image data must be base64-encoded"))?;

    let key = profile_image_key(identity);
    services
        .image_objects
        .put_object(&key, data, PROFILE_IMAGE_CONTENT_TYPE)
        .await?;
    info!("Stored profile image {}", key);

    let image_url = presigned_url(services.image_objects.as_ref(), &key).await?;
    Ok(ApiResponse::success(
        "User image updated successfully",
        ImageView { image_url },
    ))
}
