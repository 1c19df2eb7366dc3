mod common;

use serde_json::json;

use common::{alice, bob, error_message, TestContext};
use cp_backend_rust::api::ApiRequest;
use cp_backend_rust::storage::SettingsRecord;

fn full_settings() -> serde_json::Value {
    json!({ "username": "Alice A.", "email": "alice@work.example", "music_id": "m-42" })
}

#[tokio::test]
async fn get_requires_identity() {
    let ctx = TestContext::new();
    let response = ctx.send(ApiRequest::new("GET", "/user/settings")).await;
    assert_eq!(error_message(&response), "Unauthorized: No user ID found in claims");
}

#[tokio::test]
async fn put_without_identity_does_not_write() {
    let ctx = TestContext::new();
    let request = ApiRequest::new("PUT", "/user/settings").with_json(&full_settings());

    let response = ctx.send(request).await;
    assert_eq!(error_message(&response), "Unauthorized: No user ID found in claims");
    assert!(ctx.settings.is_empty().await);
}

#[tokio::test]
async fn first_time_user_sees_claims() {
    let ctx = TestContext::new();
    let response = ctx
        .send(ApiRequest::new("GET", "/user/settings").with_identity(alice()))
        .await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.json()["data"],
        json!({ "username": "alice", "email": "alice@example.com", "music_id": null })
    );
}

#[tokio::test]
async fn update_then_get_returns_stored_values() {
    let ctx = TestContext::new();

    let put = ctx
        .send(
            ApiRequest::new("PUT", "/user/settings")
                .with_identity(alice())
                .with_json(&full_settings()),
        )
        .await;
    assert_eq!(put.status_code, 200, "{}", put.body);
    assert_eq!(put.json()["data"], full_settings());

    let get = ctx
        .send(ApiRequest::new("GET", "/user/settings").with_identity(alice()))
        .await;
    assert_eq!(get.json()["data"], full_settings());
}

#[tokio::test]
async fn stored_attributes_win_over_claims_field_by_field() {
    let ctx = TestContext::new();
    ctx.settings
        .insert(SettingsRecord {
            user_id: "user-alice".into(),
            username: Some("stored-name".into()),
            email: None,
            music_id: None,
        })
        .await;

    let response = ctx
        .send(ApiRequest::new("GET", "/user/settings").with_identity(alice()))
        .await;
    assert_eq!(
        response.json()["data"],
        json!({ "username": "stored-name", "email": "alice@example.com", "music_id": null })
    );
}

#[tokio::test]
async fn each_missing_field_is_named() {
    let ctx = TestContext::new();

    for field in ["username", "email", "music_id"] {
        let mut body = full_settings();
        body.as_object_mut().unwrap().remove(field);

        let response = ctx
            .send(
                ApiRequest::new("PUT", "/user/settings")
                    .with_identity(alice())
                    .with_json(&body),
            )
            .await;
        assert_eq!(
            error_message(&response),
            format!("Missing required field: {}", field)
        );
    }
    assert!(ctx.settings.is_empty().await);
}

#[tokio::test]
async fn null_field_counts_as_missing() {
    let ctx = TestContext::new();
    let body = json!({ "username": "a", "email": "b", "music_id": null });
    let response = ctx
        .send(
            ApiRequest::new("PUT", "/user/settings")
                .with_identity(alice())
                .with_json(&body),
        )
        .await;
    assert_eq!(error_message(&response), "Missing required field: music_id");
}

#[tokio::test]
async fn non_string_field_is_rejected() {
    let ctx = TestContext::new();
    let body = json!({ "username": "a", "email": 5, "music_id": "m" });
    let response = ctx
        .send(
            ApiRequest::new("PUT", "/user/settings")
                .with_identity(alice())
                .with_json(&body),
        )
        .await;
    assert_eq!(error_message(&response), "Field 'email' must be a string");
}

#[tokio::test]
async fn last_writer_wins() {
    let ctx = TestContext::new();
    for name in ["first", "second"] {
        let body = json!({ "username": name, "email": "e", "music_id": "m" });
        ctx.send(
            ApiRequest::new("PUT", "/user/settings")
                .with_identity(alice())
                .with_json(&body),
        )
        .await;
    }

    let response = ctx
        .send(ApiRequest::new("GET", "/user/settings").with_identity(alice()))
        .await;
    assert_eq!(response.json()["data"]["username"], json!("second"));
}

#[tokio::test]
async fn settings_are_per_user() {
    let ctx = TestContext::new();
    ctx.send(
        ApiRequest::new("PUT", "/user/settings")
            .with_identity(alice())
            .with_json(&full_settings()),
    )
    .await;

    let response = ctx
        .send(ApiRequest::new("GET", "/user/settings").with_identity(bob()))
        .await;
    assert_eq!(
        response.json()["data"],
        json!({ "username": "bob", "email": null, "music_id": null })
    );
}
