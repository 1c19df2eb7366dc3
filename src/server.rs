//! Local HTTP server wrapping the dispatcher.
//!
//! Stands in for the API gateway during development: every request is
//! converted into an `ApiRequest`, bearer tokens are verified with the
//! development secret, and the dispatcher's response is written back as-is.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::{HeaderMap, Method, Uri},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

use crate::api::{ApiRequest, Dispatcher, ProxyResponse};
use crate::auth::DevTokens;
use crate::error::ApiError;
use crate::middleware::resolve_identity;
use crate::types::HttpMethod;

/// Largest request body the gateway accepts
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub dispatcher: Dispatcher,
    pub tokens: DevTokens,
}

pub fn app(dispatcher: Dispatcher, tokens: DevTokens, enable_request_logging: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .fallback(dispatch_http)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ServerState { dispatcher, tokens });

    if enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
    }))
}

async fn dispatch_http(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResponse {
    let path = uri.path().to_string();
    let reject = |err: ApiError| state.dispatcher.reject(&path, err);

    let identity = match resolve_identity(&headers, &state.tokens) {
        Ok(identity) => identity,
        Err(reason) => return reject(ApiError::unauthorized_with(reason)),
    };
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return reject(ApiError::bad_request(rejection.body_text())),
    };
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => return reject(ApiError::bad_request(rejection.body_text())),
    };
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(_) => return reject(ApiError::bad_request("Request body is not valid UTF-8")),
    };

    let request = ApiRequest {
        method: HttpMethod::parse(method.as_str()),
        path: path.clone(),
        query,
        body: (!body.is_empty()).then_some(body),
        identity,
    };
    state.dispatcher.dispatch(request).await
}

pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Local API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
