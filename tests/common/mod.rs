#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use cp_backend_rust::api::{ApiRequest, Dispatcher, ProxyResponse};
use cp_backend_rust::auth::Identity;
use cp_backend_rust::services::Services;
use cp_backend_rust::storage::{
    MemoryMusicStore, MemoryObjectStorage, MemorySettingsStore, ObjectStorage, ObjectSummary,
    StorageError,
};

pub const MUSICS_BUCKET: &str = "test-musics-bucket";
pub const IMAGE_BUCKET: &str = "test-image-bucket";
pub const SIGNING_SECRET: &str = "test-secret";

/// Dispatcher over in-memory collaborators, with handles kept for inspection
pub struct TestContext {
    pub dispatcher: Dispatcher,
    pub settings: MemorySettingsStore,
    pub music: MemoryMusicStore,
    pub music_objects: MemoryObjectStorage,
    pub image_objects: MemoryObjectStorage,
}

impl TestContext {
    pub fn new() -> Self {
        let settings = MemorySettingsStore::new();
        let music = MemoryMusicStore::new();
        let music_objects = MemoryObjectStorage::new(MUSICS_BUCKET, SIGNING_SECRET);
        let image_objects = MemoryObjectStorage::new(IMAGE_BUCKET, SIGNING_SECRET);

        let services = Services::new(
            Arc::new(settings.clone()),
            Arc::new(music.clone()),
            Arc::new(music_objects.clone()),
            Arc::new(image_objects.clone()),
        );

        Self {
            dispatcher: Dispatcher::new(services),
            settings,
            music,
            music_objects,
            image_objects,
        }
    }

    /// Same stores, but music object storage replaced
    pub fn with_music_objects(storage: Arc<dyn ObjectStorage>) -> Self {
        let mut context = Self::new();
        let services = context.dispatcher.services().clone();
        context.dispatcher = Dispatcher::new(Services {
            music_objects: storage,
            ..services
        });
        context
    }

    pub async fn send(&self, request: ApiRequest) -> ProxyResponse {
        self.dispatcher.dispatch(request).await
    }
}

pub fn alice() -> Identity {
    Identity::new("user-alice")
        .with_username("alice")
        .with_email("alice@example.com")
}

pub fn bob() -> Identity {
    Identity::new("user-bob").with_username("bob")
}

/// API Gateway REST proxy event as delivered to the function
pub fn rest_event(method: &str, path: &str) -> Value {
    json!({
        "resource": path,
        "path": path,
        "httpMethod": method,
        "headers": {
            "Host": "abc123.execute-api.us-east-1.amazonaws.com",
            "Content-Type": "application/json"
        },
        "multiValueHeaders": {
            "Host": ["abc123.execute-api.us-east-1.amazonaws.com"],
            "Content-Type": ["application/json"]
        },
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "pathParameters": null,
        "stageVariables": null,
        "requestContext": {
            "accountId": "123456789012",
            "resourceId": "a1b2c3",
            "stage": "prod",
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "identity": { "sourceIp": "203.0.113.7", "userAgent": "curl/8.0" },
            "resourcePath": path,
            "httpMethod": method,
            "apiId": "abc123",
            "protocol": "HTTP/1.1"
        },
        "body": null,
        "isBase64Encoded": false
    })
}

/// Authorizer block the Cognito user pool authorizer attaches; every claim is a string
pub fn cognito_authorizer(sub: &str, username: &str, email: &str) -> Value {
    json!({
        "claims": {
            "sub": sub,
            "aud": "7example1client2id3",
            "email_verified": "true",
            "event_id": "5a4e1f9c-0b7d-4c3e-8f2a-9d6b1e0c7a55",
            "token_use": "id",
            "auth_time": "1586470193",
            "iss": "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Example",
            "cognito:username": username,
            "exp": "Thu Apr 09 22:09:53 UTC 2020",
            "iat": "Thu Apr 09 21:09:53 UTC 2020",
            "email": email
        }
    })
}

pub fn lambda_request(event: &Value) -> lambda_http::Request {
    lambda_http::request::from_str(&event.to_string()).expect("valid proxy event")
}

/// Message of a failure envelope, panicking on success
pub fn error_message(response: &ProxyResponse) -> String {
    assert_eq!(response.status_code, 400, "expected failure, got {}", response.body);
    response.json()["error"]
        .as_str()
        .unwrap_or_else(|| panic!("no error field in {}", response.body))
        .to_string()
}

/// Object storage whose every call fails
pub struct FailingObjectStorage;

fn injected() -> StorageError {
    StorageError::Backend("injected failure".to_string())
}

#[async_trait]
impl ObjectStorage for FailingObjectStorage {
    fn bucket(&self) -> &str {
        "failing-bucket"
    }

    async fn put_object(&self, _: &str, _: Vec<u8>, _: &str) -> Result<(), StorageError> {
        Err(injected())
    }

    async fn get_object(&self, _: &str) -> Result<Vec<u8>, StorageError> {
        Err(injected())
    }

    async fn head_object(&self, _: &str) -> Result<bool, StorageError> {
        Err(injected())
    }

    async fn delete_object(&self, _: &str) -> Result<(), StorageError> {
        Err(injected())
    }

    async fn list_objects(&self, _: &str) -> Result<Vec<ObjectSummary>, StorageError> {
        Err(injected())
    }

    async fn presign_get(&self, _: &str, _: Duration) -> Result<String, StorageError> {
        Err(injected())
    }
}
