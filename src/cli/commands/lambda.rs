use lambda_http::{run, service_fn, Error, Request};
use tracing::info;

use crate::api::{lambda_path, ApiRequest, Dispatcher, ProxyResponse};
use crate::config::AppConfig;
use crate::services::Services;

/// Serve proxy requests until the runtime shuts the process down
pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let services = Services::from_config(&config).await;
    let dispatcher = Dispatcher::new(services);
    let dispatcher = &dispatcher;

    info!("Starting Lambda handler in {:?} mode", config.environment);

    run(service_fn(move |request: Request| async move {
        Ok::<_, Error>(handle_event(dispatcher, request).await.into_http())
    }))
    .await
    .map_err(|e| anyhow::anyhow!("lambda runtime failed: {}", e))
}

/// One invocation. Requests that cannot be turned into an `ApiRequest` still get an envelope.
pub async fn handle_event(dispatcher: &Dispatcher, request: Request) -> ProxyResponse {
    match ApiRequest::from_lambda(&request) {
        Ok(api_request) => dispatcher.dispatch(api_request).await,
        Err(err) => dispatcher.reject(&lambda_path(&request), err),
    }
}
