use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{DlqConfig, MqAppConfig};

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
}

/// Blob storage for uploaded design documents. Shared with the worker.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Maximum size of one stored document in bytes. Default: 50 MB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    /// Maximum multipart request body for intake in bytes. Default: 128 MB.
    #[serde(default = "default_upload_limit")]
    pub upload_limit: usize,
}

fn default_data_dir() -> String {
    "./data/blobs".into()
}
fn default_max_blob_size() -> u64 {
    50 * 1024 * 1024
}
fn default_upload_limit() -> usize {
    128 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_blob_size: default_max_blob_size(),
            upload_limit: default_upload_limit(),
        }
    }
}

/// Background workflow supervision.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    /// Seconds a review may sit in `Pending` or `InProgress` before it is failed. Default: 900.
    #[serde(default = "default_stuck_timeout_secs")]
    pub stuck_timeout_secs: u64,
    /// Seconds between stuck-review scans. Default: 60.
    #[serde(default = "default_stuck_scan_interval_secs")]
    pub stuck_scan_interval_secs: u64,
}

fn default_stuck_timeout_secs() -> u64 {
    900
}
fn default_stuck_scan_interval_secs() -> u64 {
    60
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            stuck_timeout_secs: default_stuck_timeout_secs(),
            stuck_scan_interval_secs: default_stuck_scan_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mq: MqAppConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("REVIEWER_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.data_dir", "./data/blobs")?
            .set_default("mq.enabled", true)?
            .set_default("mq.url", "redis://localhost:6379")?
            .set_default("workflow.stuck_timeout_secs", 900)?
            .set_default("workflow.stuck_scan_interval_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., REVIEWER__DATABASE__URL)
            .add_source(Environment::with_prefix("REVIEWER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
