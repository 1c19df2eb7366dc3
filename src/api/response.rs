use axum::{
    http::{HeaderName, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::ApiError;

pub const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

/// Successful operation result, wrapped into `{ "message", "data" }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    /// Success envelope as JSON
    pub fn into_envelope(self) -> Result<Value, ApiError> {
        let data = serde_json::to_value(&self.data).map_err(|e| {
            tracing::error!("Failed to serialize response data: {}", e);
            ApiError::collaborator("Failed to serialize response data")
        })?;
        Ok(json!({
            "message": self.message,
            "data": data,
        }))
    }
}

impl ApiResponse<Value> {
    /// Success without a payload; `data` is an empty object
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::success(message, json!({}))
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// CORS headers attached to every response for a route
pub fn cors_headers(allow_methods: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Methods".to_string(), allow_methods.to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}

/// Outbound response descriptor: status, CORS headers and a JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn from_outcome(outcome: Result<Value, ApiError>, allow_methods: &str) -> Self {
        let (status_code, body) = match outcome {
            Ok(envelope) => (200, envelope),
            Err(err) => (err.status_code(), err.to_json()),
        };
        Self {
            status_code,
            headers: cors_headers(allow_methods),
            body: body.to_string(),
        }
    }

    /// Body parsed back into JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// HTTP response shared by the Lambda adapter and the local server
    pub fn into_http(self) -> Response<String> {
        let mut response = Response::new(self.body);
        *response.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header {}", name),
            }
        }
        response
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> axum::response::Response {
        self.into_http().into_response()
    }
}
