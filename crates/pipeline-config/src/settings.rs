//! Typed view over the merged configuration mapping, so downstream crates
//! don't each re-derive the same `serde_yaml::Value` field lookups.

use crate::error::ConfigError;
use serde::Deserialize;
use serde_yaml::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    pub host: String,
    #[serde(default = "default_amqp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub exchange: String,
    pub queue_name: String,
    pub queue_retry: String,
    pub queue_dlq: String,
    pub queue_ttl_milliseconds: u32,
}

fn default_amqp_port() -> u16 {
    5672
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketSettings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Publish routing key used by the control plane when enqueuing a job.
    pub source_router: String,
    /// Routing key used when requeueing a failed job onto the retry path.
    pub retry_router: String,
    /// Staging bucket jobs validate out of (conventionally `gold`).
    #[serde(default = "default_source_bucket")]
    pub source_bucket: String,
    /// Destination bucket for records with no findings.
    #[serde(default = "default_validate_bucket")]
    pub validate_bucket: String,
    /// Destination bucket for records with one or more findings.
    #[serde(default = "default_quarantine_bucket")]
    pub quarantine_bucket: String,
}

fn default_source_bucket() -> String {
    "gold".to_string()
}

fn default_validate_bucket() -> String {
    "validated".to_string()
}

fn default_quarantine_bucket() -> String {
    "quarantine".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub broker: BrokerSettings,
    pub bucket: BucketSettings,
    pub storage: StorageSettings,
    pub app: AppSettings,
}

impl PipelineSettings {
    pub fn from_merged(value: Value) -> Result<Self, ConfigError> {
        serde_yaml::from_value(value).map_err(|source| ConfigError::ParseError {
            path: "<merged configuration>".to_string(),
            source,
        })
    }
}
