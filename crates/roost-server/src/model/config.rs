//! Configuration management for Roost server
//!
//! This module handles loading and accessing application configuration.

use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use roost_auth::model::{
    BCRYPT_COST, DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_EXPIRE_SECONDS, DEFAULT_TOKEN_SECRET_KEY,
    TOKEN_EXPIRE_SECONDS, TOKEN_SECRET_KEY,
};
use roost_common::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use roost_persistence::StorageMode;

use crate::startup::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_CONTEXT_PATH: &str = "/api/v1";
pub const STORAGE_MODE: &str = "roost.storage.mode";
pub const DEFAULT_UPLOAD_EXPIRE_SECONDS: u64 = 300;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(version, about = "Roost marketplace server")]
struct Cli {
    /// Path of the YAML configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Storage backend: external_db or memory
    #[arg(short = 's', long = "storage")]
    storage: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load from the command line, the YAML file it names, and `ROOST_*`
    /// environment variables, in increasing order of precedence for the
    /// latter two and with CLI flags overriding everything.
    pub fn new() -> Result<Self, ConfigError> {
        let args = Cli::parse();

        let mut overrides = Vec::new();
        if let Some(v) = args.database_url {
            overrides.push(("db.url", v));
        }
        if let Some(v) = args.storage {
            overrides.push((STORAGE_MODE, v));
        }

        Self::load(&args.config_file, overrides)
    }

    pub fn load(config_file: &str, overrides: Vec<(&str, String)>) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("ROOST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, value) in overrides {
            config_builder = config_builder.set_override(key, value)?;
        }

        Ok(Configuration {
            config: config_builder.build()?,
        })
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    pub fn server_context_path(&self) -> String {
        self.config
            .get_string("server.contextPath")
            .unwrap_or(DEFAULT_CONTEXT_PATH.to_string())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(
            self.config
                .get_int("server.shutdownTimeoutSeconds")
                .unwrap_or(10) as u64,
        )
    }

    // ========================================================================
    // Storage Configuration
    // ========================================================================

    pub fn storage_mode(&self) -> StorageMode {
        self.config
            .get_string(STORAGE_MODE)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(StorageMode::ExternalDb)
    }

    pub async fn database_connection(
        &self,
    ) -> std::result::Result<DatabaseConnection, Box<dyn std::error::Error>> {
        let max_connections = self
            .config
            .get_int("db.pool.maximumPoolSize")
            .unwrap_or(20) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.minimumPoolSize")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.connectionTimeout")
            .unwrap_or(30) as u64;
        let idle_timeout = self.config.get_int("db.pool.idleTimeout").unwrap_or(10) as u64;
        let max_lifetime = self.config.get_int("db.pool.maxLifetime").unwrap_or(1800) as u64;
        let sqlx_logging = self
            .config
            .get_bool("db.pool.sqlxLogging")
            .unwrap_or(false);

        let url = self.config.get_string("db.url")?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            idle_timeout = idle_timeout,
            max_lifetime = max_lifetime,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }

    // ========================================================================
    // Auth Configuration
    // ========================================================================

    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string(TOKEN_SECRET_KEY)
            .unwrap_or(DEFAULT_TOKEN_SECRET_KEY.to_string())
    }

    pub fn auth_token_expire_seconds(&self) -> i64 {
        self.config
            .get_int(TOKEN_EXPIRE_SECONDS)
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config
            .get_int(BCRYPT_COST)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_BCRYPT_COST)
    }

    // ========================================================================
    // Upload Configuration
    // ========================================================================

    pub fn s3_bucket(&self) -> String {
        self.config
            .get_string("roost.s3.bucket")
            .unwrap_or_default()
    }

    pub fn s3_region(&self) -> String {
        self.config
            .get_string("roost.s3.region")
            .unwrap_or("us-east-1".to_string())
    }

    pub fn s3_prefix(&self) -> String {
        self.config
            .get_string("roost.s3.prefix")
            .unwrap_or("uploads".to_string())
    }

    /// Base URL objects are served from; defaults to the bucket's virtual-host URL
    pub fn s3_public_base_url(&self) -> String {
        self.config
            .get_string("roost.s3.publicBaseUrl")
            .unwrap_or_else(|_| {
                format!(
                    "https://{}.s3.{}.amazonaws.com",
                    self.s3_bucket(),
                    self.s3_region()
                )
            })
    }

    pub fn s3_expire_seconds(&self) -> u64 {
        self.config
            .get_int("roost.s3.expireSeconds")
            .map(|v| v as u64)
            .unwrap_or(DEFAULT_UPLOAD_EXPIRE_SECONDS)
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// At least 1; zero or negative values fall back to the default
    pub fn max_page_size(&self) -> u64 {
        self.config
            .get_int("roost.pagination.maxPageSize")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(MAX_PAGE_SIZE)
    }

    /// Clamp a requested size to `1..=max_page_size` and a requested page to
    /// `1..` with an upper bound that keeps the row offset within `u64`
    pub fn page_bounds(&self, page_no: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, self.max_page_size());
        let page_no = page_no.unwrap_or(1).clamp(1, u64::MAX / page_size);
        (page_no, page_size)
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        let mut logging = LoggingConfig::from_env();
        if let Ok(dir) = self.config.get_string("roost.logs.path") {
            logging.log_dir = dir.into();
        }
        logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn configuration(pairs: &[(&str, &str)]) -> Configuration {
        let mut builder = Config::builder();
        for (k, v) in pairs {
            builder = builder.set_override(*k, *v).unwrap();
        }
        Configuration::from_config(builder.build().unwrap())
    }

    #[test]
    fn test_defaults() {
        let c = configuration(&[]);
        assert_eq!(c.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(c.server_context_path(), "/api/v1");
        assert_eq!(c.storage_mode(), StorageMode::ExternalDb);
        assert_eq!(c.auth_token_expire_seconds(), DEFAULT_TOKEN_EXPIRE_SECONDS);
        assert_eq!(c.s3_expire_seconds(), 300);
        assert_eq!(c.max_page_size(), 100);
    }

    #[test]
    fn test_page_bounds() {
        let c = configuration(&[]);
        assert_eq!(c.page_bounds(None, None), (1, 20));
        assert_eq!(c.page_bounds(Some(0), Some(0)), (1, 1));
        assert_eq!(c.page_bounds(Some(3), Some(500)), (3, 100));

        let c = configuration(&[("roost.pagination.maxPageSize", "10")]);
        assert_eq!(c.page_bounds(Some(1), Some(50)), (1, 10));

        let (page_no, page_size) = c.page_bounds(Some(u64::MAX), Some(10));
        assert_eq!(page_no, u64::MAX / 10);
        assert!((page_no - 1).checked_mul(page_size).is_some());
    }

    #[test]
    fn test_invalid_max_page_size_falls_back() {
        for raw in ["0", "-5"] {
            let c = configuration(&[("roost.pagination.maxPageSize", raw)]);
            assert_eq!(c.max_page_size(), MAX_PAGE_SIZE);
            assert_eq!(c.page_bounds(None, Some(1000)), (1, MAX_PAGE_SIZE));
        }
    }

    #[test]
    fn test_public_base_url_fallback() {
        let c = configuration(&[("roost.s3.bucket", "photos"), ("roost.s3.region", "eu-west-1")]);
        assert_eq!(
            c.s3_public_base_url(),
            "https://photos.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_load_file_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\nroost:\n  storage:\n    mode: external_db"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let c = Configuration::load(&path, vec![(STORAGE_MODE, "memory".to_string())]).unwrap();

        assert_eq!(c.server_port(), 9090);
        assert_eq!(c.storage_mode(), StorageMode::Memory);
    }
}
