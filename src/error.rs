// API Error Types
use serde_json::{json, Value};
use thiserror::Error;

use crate::storage::StorageError;

/// Message returned whenever a personalized or mutating operation runs without identity
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: No user ID found in claims";

/// Operation-boundary error. Every variant is reported to the caller as a
/// failure envelope with status 400; the variant only drives logging.
#[derive(Debug, Error)]
pub enum ApiError {
    // Personalized or mutating operation without a resolved identity
    #[error("{0}")]
    Unauthorized(String),

    // Request body or query lacks a required field
    #[error("{0}")]
    MissingField(String),

    // Requested record or object does not exist
    #[error("{0}")]
    NotFound(String),

    // Store or object-storage call failed
    #[error("{0}")]
    Collaborator(String),

    // Malformed input: invalid JSON, invalid base64, wrong field types
    #[error("{0}")]
    BadRequest(String),

    #[error("Unsupported path: {0}")]
    UnsupportedPath(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

impl ApiError {
    /// HTTP status code. The contract does not distinguish failure classes.
    pub fn status_code(&self) -> u16 {
        400
    }

    /// Client-facing error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Convert to the failure envelope
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }

    /// Error code used in log lines
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Collaborator(_) => "COLLABORATOR_FAILURE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::UnsupportedPath(_) => "UNSUPPORTED_PATH",
            ApiError::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
        }
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    }

    pub fn unauthorized_with(reason: impl Into<String>) -> Self {
        ApiError::Unauthorized(format!("Unauthorized: {}", reason.into()))
    }

    /// `Missing required field: <field>`
    pub fn missing_field(field: &str) -> Self {
        ApiError::MissingField(format!("Missing required field: {}", field))
    }

    /// Missing field with a handler-specific message, e.g. `Title is required`
    pub fn required(message: impl Into<String>) -> Self {
        ApiError::MissingField(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        ApiError::Collaborator(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unsupported_path(path: impl Into<String>) -> Self {
        ApiError::UnsupportedPath(path.into())
    }

    pub fn unsupported_method(method: impl Into<String>) -> Self {
        ApiError::UnsupportedMethod(method.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => ApiError::not_found(msg),
            StorageError::InvalidKey(key) => {
                ApiError::bad_request(format!("Invalid storage key: {}", key))
            }
            other => {
                tracing::error!("Collaborator error: {}", other);
                ApiError::collaborator(other.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON body: {}", err))
    }
}
