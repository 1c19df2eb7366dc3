use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::request::ApiRequest;
use crate::api::response::{ApiResponse, ApiResult};
use crate::services::Services;
use crate::storage::{presigned_url, ObjectStorage, StorageError};

pub const DECODED_PREFIX: &str = "decoded/";
pub const RESULTS_PREFIX: &str = "results/";
pub const HISTORY_LIMIT: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub s3_key: String,
    pub last_modified: String,
    pub presigned_url: Option<String>,
    /// Present only when results were requested; `null` when none exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryList {
    pub history_list: Vec<HistoryItem>,
}

/// Key of the result blob produced for a decoded image:
/// `decoded/<stem>.<ext>` maps to `results/<stem>.json`.
pub fn result_key(image_key: &str) -> Option<String> {
    let rest = image_key.strip_prefix(DECODED_PREFIX)?;
    let stem = match rest.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => rest,
    };
    Some(format!("{}{}.json", RESULTS_PREFIX, stem))
}

async fn load_result(storage: &dyn ObjectStorage, image_key: &str) -> Result<Value, StorageError> {
    let Some(key) = result_key(image_key) else {
        return Ok(Value::Null);
    };
    if !storage.head_object(&key).await? {
        debug!("No result stored for {}", image_key);
        return Ok(Value::Null);
    }
    let bytes = storage.get_object(&key).await?;
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}

/// GET /history/list[?with_results=true]
pub async fn list(services: &Services, request: &ApiRequest) -> ApiResult<HistoryList> {
    let with_results = matches!(request.query_param("with_results"), Some("true") | Some("1"));
    let storage = services.image_objects.as_ref();

    let mut objects: Vec<_> = storage
        .list_objects(DECODED_PREFIX)
        .await?
        .into_iter()
        .filter(|object| !object.is_directory())
        .collect();
    objects.sort_by(|a, b| b.key.cmp(&a.key));
    objects.truncate(HISTORY_LIMIT);

    let mut history_list = Vec::with_capacity(objects.len());
    for object in objects {
        let presigned_url = presigned_url(storage, &object.key).await?;
        let result = if with_results {
            Some(load_result(storage, &object.key).await?)
        } else {
            None
        };
        history_list.push(HistoryItem {
            last_modified: object.last_modified.format("%Y-%m-%d %H:%M:%S").to_string(),
            s3_key: object.key,
            presigned_url,
            result,
        });
    }

    Ok(ApiResponse::success(
        "History list retrieved successfully",
        HistoryList { history_list },
    ))
}
