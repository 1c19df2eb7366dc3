use tracing::info;

use crate::api::Dispatcher;
use crate::auth::DevTokens;
use crate::config::{AppConfig, StorageBackend};
use crate::server;
use crate::services::Services;

pub async fn handle(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if memory {
        config.storage.backend = StorageBackend::Memory;
    }
    if config.security.dev_secret.is_empty() {
        anyhow::bail!("DEV_SECRET must be set to run the local server");
    }

    info!(
        "Starting local server in {:?} mode with {:?} collaborators",
        config.environment, config.storage.backend
    );

    let services = Services::from_config(&config).await;
    let tokens = DevTokens::new(
        config.security.dev_secret.clone(),
        config.security.dev_token_expiry_hours,
    );
    let app = server::app(
        Dispatcher::new(services),
        tokens,
        config.server.enable_request_logging,
    );

    server::serve(app, port.unwrap_or(config.server.port)).await
}
