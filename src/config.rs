//! Configuration management for the scoring service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::ScoringPolicy;

/// Main application configuration
///
/// Loaded from `config/config.toml` when present, overlaid with `FRAUD_*`
/// environment variables (`FRAUD_SERVER__PORT=9090` sets `server.port`).
/// Every field has a default, so the service also starts with no
/// configuration at all.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub scoring: ScoringPolicy,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX classifier artifact
    pub model_path: String,
    /// Path to the feature schema descriptor
    pub schema_path: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "models/fraud_model.onnx".to_string(),
            schema_path: "models/feature_info.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between periodic metrics summaries (0 disables the reporter)
    pub summary_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            summary_interval_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config")
    }

    /// Load configuration from a specific path (extension resolved by the
    /// config loader), overlaid with `FRAUD_*` environment variables
    pub fn load_from_path(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("FRAUD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
