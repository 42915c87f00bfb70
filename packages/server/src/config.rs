use std::time::Duration;

use common::Role;
use common::config::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use uuid::Uuid;

use crate::catalog::ingest::IngestionLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// Unset keeps idle connections open indefinitely.
    pub idle_timeout_secs: Option<u64>,
    pub max_lifetime_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestionConfig {
    pub max_files: usize,
    /// Request body limit for the upload route.
    pub max_request_bytes: usize,
    pub blob_write_timeout_secs: u64,
    pub catalog_write_timeout_secs: u64,
}

impl IngestionConfig {
    pub fn limits(&self) -> IngestionLimits {
        IngestionLimits {
            max_files: self.max_files,
            blob_write_timeout: Duration::from_secs(self.blob_write_timeout_secs),
            catalog_write_timeout: Duration::from_secs(self.catalog_write_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub default_per_page: u64,
    pub max_per_page: u64,
    /// Used for date filters when the request does not say.
    pub tz_offset_minutes: i32,
}

/// A principal to make sure exists on startup.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedPrincipal {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
    pub organization_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub principals: Vec<SeedPrincipal>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("ingestion.max_files", 50)?
            .set_default("ingestion.max_request_bytes", 512 * 1024 * 1024)?
            .set_default("ingestion.blob_write_timeout_secs", 120)?
            .set_default("ingestion.catalog_write_timeout_secs", 15)?
            .set_default("catalog.default_per_page", 20)?
            .set_default("catalog.max_per_page", 100)?
            .set_default("catalog.tz_offset_minutes", 0)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PARTVAULT__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("PARTVAULT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
