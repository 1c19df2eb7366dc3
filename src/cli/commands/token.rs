use serde_json::json;

use crate::auth::DevTokens;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(
    config: &AppConfig,
    user_id: &str,
    username: Option<String>,
    email: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let tokens = DevTokens::new(
        config.security.dev_secret.clone(),
        config.security.dev_token_expiry_hours,
    );
    let token = tokens.issue(user_id, username.as_deref(), email.as_deref())?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "token": token,
                "user_id": user_id,
                "expires_in_hours": config.security.dev_token_expiry_hours,
            })
        ),
    }
    Ok(())
}
