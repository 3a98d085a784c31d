use serde::Deserialize;

/// App-level MQ configuration shared by server and worker.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Whether MQ is enabled. Default: true.
    /// Note: Worker ignores this field (always requires MQ).
    #[serde(default = "default_mq_enabled")]
    pub enabled: bool,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Review jobs (server publishes, worker consumes). Default: "review_jobs".
    #[serde(default = "default_mq_queue_name")]
    pub queue_name: String,
    /// Review outcomes (worker publishes, server consumes). Default: "review_results".
    #[serde(default = "default_mq_result_queue_name")]
    pub result_queue_name: String,
    /// Dead-lettered messages (both sides publish, server consumes). Default: "review_dlq".
    #[serde(default = "default_mq_dlq_queue_name")]
    pub dlq_queue_name: String,
    #[serde(default)]
    pub dlq: DlqConfig,
}

fn default_mq_enabled() -> bool {
    true
}
fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_mq_queue_name() -> String {
    "review_jobs".into()
}
fn default_mq_result_queue_name() -> String {
    "review_results".into()
}
fn default_mq_dlq_queue_name() -> String {
    "review_dlq".into()
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_mq_enabled(),
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            queue_name: default_mq_queue_name(),
            result_queue_name: default_mq_result_queue_name(),
            dlq_queue_name: default_mq_dlq_queue_name(),
            dlq: DlqConfig::default(),
        }
    }
}

/// Retry settings applied before a message is dead-lettered.
#[derive(Debug, Deserialize, Clone)]
pub struct DlqConfig {
    /// Retries after the first failed attempt. Default: 3.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Backoff for the first retry. Default: 1000.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff ceiling. Default: 30000.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u8 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for DlqConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}
