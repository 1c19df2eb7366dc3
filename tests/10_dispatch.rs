mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use common::{alice, cognito_authorizer, error_message, lambda_request, rest_event, TestContext};
use cp_backend_rust::api::ApiRequest;
use cp_backend_rust::cli::commands::lambda::handle_event;

#[tokio::test]
async fn unknown_path_is_rejected() {
    let ctx = TestContext::new();
    let response = ctx.send(ApiRequest::new("GET", "/nowhere")).await;

    assert_eq!(error_message(&response), "Unsupported path: /nowhere");
    assert_eq!(response.header("Access-Control-Allow-Methods"), Some("OPTIONS"));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
}

#[tokio::test]
async fn unknown_method_on_known_path_is_rejected() {
    let ctx = TestContext::new();
    let response = ctx.send(ApiRequest::new("PATCH", "/music")).await;

    assert_eq!(error_message(&response), "Unsupported HTTP method: PATCH");
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("OPTIONS,GET,POST,DELETE")
    );
}

#[tokio::test]
async fn method_from_another_route_is_rejected() {
    let ctx = TestContext::new();
    let response = ctx.send(ApiRequest::new("DELETE", "/music/list")).await;
    assert_eq!(error_message(&response), "Unsupported HTTP method: DELETE");
}

#[tokio::test]
async fn preflight_succeeds_on_known_paths() {
    let ctx = TestContext::new();
    let response = ctx.send(ApiRequest::new("OPTIONS", "/user/settings")).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.json(), json!({ "message": "OK", "data": {} }));
    assert_eq!(response.header("Access-Control-Allow-Methods"), Some("OPTIONS,GET,PUT"));
}

#[tokio::test]
async fn cors_headers_match_between_success_and_failure() {
    let ctx = TestContext::new();

    let ok = ctx.send(ApiRequest::new("GET", "/music/list")).await;
    let failed = ctx.send(ApiRequest::new("POST", "/music/list")).await;

    assert_eq!(ok.status_code, 200);
    assert_eq!(failed.status_code, 400);
    assert_eq!(ok.headers, failed.headers);
}

#[tokio::test]
async fn every_path_gets_the_full_cors_set() {
    let ctx = TestContext::new();
    for path in ["/user/settings", "/user/image", "/music", "/music/list", "/history/list", "/x"] {
        let response = ctx.send(ApiRequest::new("GET", path)).await;
        for header in [
            "Access-Control-Allow-Headers",
            "Access-Control-Allow-Origin",
            "Access-Control-Allow-Methods",
        ] {
            assert!(response.header(header).is_some(), "{header} missing on {path}");
        }
    }
}

#[tokio::test]
async fn cognito_authorized_request_flows_through_the_dispatcher() {
    let ctx = TestContext::new();
    let mut event = rest_event("PUT", "/user/settings");
    event["requestContext"]["authorizer"] =
        cognito_authorizer("user-alice", "alice", "alice@example.com");
    event["body"] = json!(json!({ "username": "alice", "email": "a@example.com", "music_id": "m1" }).to_string());

    let response = handle_event(&ctx.dispatcher, lambda_request(&event)).await;
    assert_eq!(response.status_code, 200, "{}", response.body);
    assert_eq!(ctx.settings.len().await, 1);

    let mut event = rest_event("GET", "/user/settings");
    event["requestContext"]["authorizer"] =
        cognito_authorizer("user-alice", "alice", "alice@example.com");
    let response = handle_event(&ctx.dispatcher, lambda_request(&event)).await;
    assert_eq!(
        response.json()["data"],
        json!({ "username": "alice", "email": "a@example.com", "music_id": "m1" })
    );
}

#[tokio::test]
async fn event_without_authorizer_is_anonymous() {
    let ctx = TestContext::new();
    let event = rest_event("GET", "/user/settings");

    let response = handle_event(&ctx.dispatcher, lambda_request(&event)).await;
    assert_eq!(error_message(&response), "Unauthorized: No user ID found in claims");
}

#[tokio::test]
async fn query_parameters_reach_the_handler() {
    let ctx = TestContext::new();
    let mut event = rest_event("GET", "/music");
    event["queryStringParameters"] = json!({ "music_id": "missing" });
    event["multiValueQueryStringParameters"] = json!({ "music_id": ["missing"] });

    let response = handle_event(&ctx.dispatcher, lambda_request(&event)).await;
    assert_eq!(error_message(&response), "Music not found");
}

#[tokio::test]
async fn non_utf8_event_body_gets_an_envelope() {
    let ctx = TestContext::new();
    let mut event = rest_event("POST", "/music");
    event["requestContext"]["authorizer"] =
        cognito_authorizer("user-alice", "alice", "alice@example.com");
    event["body"] = json!(STANDARD.encode([0xff, 0xfe, 0xfd]));
    event["isBase64Encoded"] = json!(true);

    let response = handle_event(&ctx.dispatcher, lambda_request(&event)).await;
    assert_eq!(error_message(&response), "Request body is not valid UTF-8");
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("OPTIONS,GET,POST,DELETE")
    );
    assert!(ctx.music.is_empty().await);
}

#[tokio::test]
async fn lambda_response_keeps_status_and_cors() {
    let ctx = TestContext::new();
    let response = handle_event(&ctx.dispatcher, lambda_request(&rest_event("DELETE", "/music/list")))
        .await
        .into_http();

    assert_eq!(response.status(), 400);
    assert_eq!(response.headers().get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(response.body()).unwrap(),
        json!({ "error": "Unsupported HTTP method: DELETE" })
    );
}

#[tokio::test]
async fn invalid_json_body_is_a_failure_envelope() {
    let ctx = TestContext::new();
    let request = ApiRequest::new("PUT", "/user/settings")
        .with_identity(alice())
        .with_body("{not json");

    let response = ctx.send(request).await;
    assert!(error_message(&response).starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn requests_are_independent_after_a_failure() {
    let ctx = TestContext::new();
    let failed = ctx.send(ApiRequest::new("GET", "/music")).await;
    assert_eq!(error_message(&failed), "Music ID is required");

    let ok = ctx.send(ApiRequest::new("GET", "/music/list")).await;
    assert_eq!(ok.status_code, 200);
}
