use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use std::time::Duration;
use config;

use crate::content::title_lookup::DEFAULT_ENDPOINT;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub database_path: String,
    pub media_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub session_secret_key: String,
    pub use_secure_cookies: bool,
    /// Prefix for public object URLs; empty means site-relative.
    pub public_base_url: String,
    pub title_lookup_endpoint: String,
    pub title_lookup_timeout_secs: u64,
}

fn required_var(name: &str) -> Result<String, config::ConfigError> {
    env::var(name).map_err(|_| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", name
    )))
}

fn require_absolute(name: &str, value: &str) -> Result<(), config::ConfigError> {
    if Path::new(value).is_relative() {
        return Err(config::ConfigError::Message(format!(
            "FATAL: The '{}' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
            name, value
        )));
    }
    Ok(())
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        let database_path = required_var("DATABASE_PATH")?;
        let media_path = required_var("MEDIA_PATH")?;
        let session_secret_key = required_var("SESSION_SECRET_KEY")?;

        // 128 hex characters decode to the 64-byte cookie signing key.
        if session_secret_key.len() != 128 || !session_secret_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(config::ConfigError::Message(
                "FATAL: 'SESSION_SECRET_KEY' must be 128 hexadecimal characters long (64 bytes).".to_string()
            ));
        }

        require_absolute("DATABASE_PATH", &database_path)?;
        require_absolute("MEDIA_PATH", &media_path)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let use_secure_cookies = env::var("USE_SECURE_COOKIES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        if !public_base_url.is_empty() && !crate::content::is_http_url(&public_base_url) {
            return Err(config::ConfigError::Message(format!(
                "FATAL: 'PUBLIC_BASE_URL' must be an http(s) URL, got '{}'.", public_base_url
            )));
        }

        let title_lookup_endpoint = env::var("TITLE_LOOKUP_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let title_lookup_timeout_secs = env::var("TITLE_LOOKUP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        let builder = config::Config::builder()
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("media_path", media_path)?
            .set_override("session_secret_key", session_secret_key)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("use_secure_cookies", use_secure_cookies)?
            .set_override("public_base_url", public_base_url)?
            .set_override("title_lookup_endpoint", title_lookup_endpoint)?
            .set_override("title_lookup_timeout_secs", title_lookup_timeout_secs as i64)?
            .build()?;

        builder.try_deserialize()
    }

    /// SQLite file holding accounts, profiles, preferences, projects and media.
    pub fn users_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("accounts")
            .join("accounts.db")
    }

    /// Redb file holding posts and their indexes.
    pub fn posts_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("posts")
            .join("posts.db")
    }

    pub fn title_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.title_lookup_timeout_secs)
    }
}
