use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut shown = config.clone();
    if !shown.security.dev_secret.is_empty() {
        shown.security.dev_secret = "<redacted>".to_string();
    }

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Text => {
            let storage = &shown.storage;
            println!("environment:         {:?}", shown.environment);
            println!("storage backend:     {:?}", storage.backend);
            println!("user settings table: {}", storage.user_settings_table);
            println!("musics table:        {}", storage.musics_table);
            println!("musics bucket:       {}", storage.musics_bucket);
            println!("image bucket:        {}", storage.image_bucket);
            println!("server port:         {}", shown.server.port);
            println!("json logs:           {}", shown.logging.json);
        }
    }
    Ok(())
}
