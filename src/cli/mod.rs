pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "cp-backend")]
#[command(about = "Music, settings, profile image and history API handlers")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run inside the Lambda runtime (default when no command is given)")]
    Lambda,

    #[command(about = "Run the local development server")]
    Serve {
        #[arg(long, help = "Port to listen on (defaults to PORT or config)")]
        port: Option<u16>,
        #[arg(long, help = "Force in-memory collaborators")]
        memory: bool,
    },

    #[command(about = "Issue a development bearer token for the local server")]
    Token {
        #[arg(help = "Subject (user id)")]
        user_id: String,
        #[arg(long, help = "Display name claim")]
        username: Option<String>,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
    },

    #[command(about = "Print the effective configuration")]
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Lambda) {
        Commands::Lambda => commands::lambda::handle(config).await,
        Commands::Serve { port, memory } => commands::serve::handle(config, port, memory).await,
        Commands::Token {
            user_id,
            username,
            email,
        } => commands::token::handle(&config, &user_id, username, email, output_format),
        Commands::Config => commands::config::handle(&config, output_format),
    }
}
