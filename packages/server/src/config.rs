use common::storage::StorageConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Scheme used when building same-origin file URLs.
    pub schema: String,
    /// Public `host[:port]` used when building same-origin file URLs.
    pub host_name: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_size: u64,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Same-origin proxy URL for a stored file.
    pub fn file_url(&self, file_id: i64) -> String {
        format!("{}://{}/api/v1/file/{file_id}", self.schema, self.host_name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    /// Private in-memory SQLite database. A single pooled connection keeps
    /// every query on the same database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    /// Token lifetime in seconds.
    pub expire_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::defaults()?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., KEEPSAKE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("KEEPSAKE").separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8182)?
            .set_default("server.schema", "http")?
            .set_default("server.host_name", "localhost:8182")?
            .set_default("server.max_upload_size", 32 * 1024 * 1024)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("log.level", "debug")?
            .set_default("auth.issuer", "keepsake")?
            .set_default("auth.expire_secs", 900)?
            .set_default("database.url", "sqlite://./data/keepsake.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.sqlx_logging", false)?
            .set_default("storage.backend", "local")?
            .set_default("storage.access.proxy", true)?
            .set_default("storage.access.image_proxy.enabled", false)?
            .set_default("storage.access.image_proxy.base_url", "http://localhost:8080")?
            .set_default("storage.local.root", "./data/uploads")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.auth.expire_secs <= 0 {
            return Err(ConfigError::Message(
                "auth.expire_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::storage::Backend;

    use super::*;

    fn with_secret(secret: &str) -> AppConfig {
        AppConfig::defaults()
            .unwrap()
            .set_override("auth.jwt_secret", secret)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_fill_every_section() {
        let config = with_secret(&"k".repeat(32));

        assert_eq!(config.server.port, 8182);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.auth.issuer, "keepsake");
        assert_eq!(config.auth.expire_secs, 900);
        assert_eq!(config.storage.backend, Backend::Local);
        assert!(config.storage.access.proxy);
        assert!(!config.storage.access.image_proxy.enabled);
        assert!(config.storage.s3.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(with_secret("too-short").validate().is_err());
    }

    #[test]
    fn file_url_uses_public_host() {
        let config = with_secret(&"k".repeat(32));
        assert_eq!(
            config.server.file_url(42),
            "http://localhost:8182/api/v1/file/42"
        );
    }
}
