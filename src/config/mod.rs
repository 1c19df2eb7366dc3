use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Aws,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "aws" => Some(StorageBackend::Aws),
            "memory" | "mem" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub user_settings_table: String,
    pub musics_table: String,
    pub musics_bucket: String,
    pub image_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Signs development bearer tokens and in-memory download links
    pub dev_secret: String,
    pub dev_token_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.storage.backend = StorageBackend::parse(&v).unwrap_or(self.storage.backend);
        }
        if let Ok(v) = env::var("USER_SETTINGS_TABLE") {
            self.storage.user_settings_table = v;
        }
        if let Ok(v) = env::var("MUSICS_TABLE") {
            self.storage.musics_table = v;
        }
        if let Ok(v) = env::var("MUSICS_BUCKET") {
            self.storage.musics_bucket = v;
        }
        if let Ok(v) = env::var("IMAGE_BUCKET") {
            self.storage.image_bucket = v;
        }

        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging =
                v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_JSON") {
            self.logging.json = v.parse().unwrap_or(self.logging.json);
        }

        // Security overrides
        if let Ok(v) = env::var("DEV_SECRET") {
            self.security.dev_secret = v;
        }
        if let Ok(v) = env::var("DEV_TOKEN_EXPIRY_HOURS") {
            self.security.dev_token_expiry_hours =
                v.parse().unwrap_or(self.security.dev_token_expiry_hours);
        }

        self
    }

    fn storage_defaults(backend: StorageBackend) -> StorageConfig {
        StorageConfig {
            backend,
            user_settings_table: "cp-hackathon-backend-user-settings-db-table".to_string(),
            musics_table: "cp-hackathon-backend-musics-db-table".to_string(),
            musics_bucket: "cp-hackathon-backend-musics-bucket".to_string(),
            image_bucket: "raspberrypi-image-storage".to_string(),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            storage: Self::storage_defaults(StorageBackend::Memory),
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            logging: LoggingConfig { json: false },
            security: SecurityConfig {
                dev_secret: "development-secret".to_string(),
                dev_token_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            storage: Self::storage_defaults(StorageBackend::Aws),
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            logging: LoggingConfig { json: true },
            security: SecurityConfig {
                dev_secret: String::new(),
                dev_token_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            storage: Self::storage_defaults(StorageBackend::Aws),
            server: ServerConfig {
                port: 8080,
                enable_request_logging: false,
            },
            logging: LoggingConfig { json: true },
            security: SecurityConfig {
                dev_secret: String::new(),
                dev_token_expiry_hours: 1,
            },
        }
    }
}
