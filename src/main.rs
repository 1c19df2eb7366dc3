use clap::Parser;
use tracing_subscriber::EnvFilter;

use cp_backend_rust::cli::{self, Cli};
use cp_backend_rust::config::{AppConfig, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // CloudWatch adds its own timestamps to every line
    if logging.json {
        builder.json().without_time().with_current_span(false).init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up table and bucket overrides
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
