//! Fraud Scoring Service - Main Entry Point
//!
//! Loads the classifier artifact and schema descriptor once at startup and
//! serves the scoring API. A missing artifact does not abort startup; the
//! service runs with scoring disabled until restarted with a valid one.

use anyhow::Result;
use fraud_scoring_service::config::{AppConfig, LoggingConfig};
use fraud_scoring_service::metrics::{MetricsReporter, ScoringMetrics};
use fraud_scoring_service::model::load_scoring_model;
use fraud_scoring_service::pipeline::ScoringPipeline;
use fraud_scoring_service::server::{self, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    init_tracing(&config.logging);

    info!("Starting Fraud Scoring Service");
    info!(
        "Decision threshold: {:.2}, risk tiers: LOW < {:.2} <= MEDIUM < {:.2} <= HIGH",
        config.scoring.decision_threshold, config.scoring.tiers.medium, config.scoring.tiers.high
    );

    let metrics = Arc::new(ScoringMetrics::new());

    let model = load_scoring_model(
        &config.model.model_path,
        &config.model.schema_path,
        config.model.onnx_threads,
    )?;
    let pipeline = Arc::new(ScoringPipeline::new(model, config.scoring));
    info!(model_loaded = pipeline.is_ready(), "Scoring pipeline initialized");

    if config.metrics.summary_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.summary_interval_secs);
        tokio::spawn(async move {
            reporter.start().await;
        });
    }

    let state = AppState { pipeline, metrics };
    server::run(&config.server, state).await
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
