//! Scoring API handlers

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ScoringError;
use crate::server::response::{
    BatchPredictResponse, HealthResponse, ModelInfoResponse, PredictResponse,
};
use crate::server::{ApiResult, AppState};
use crate::types::{RawRecord, RecordOutcome};

/// Body of `POST /api/batch_predict`.
#[derive(Debug, Deserialize)]
pub struct BatchPredictRequest {
    pub transactions: Vec<RawRecord>,
}

/// Score one transaction record
pub async fn predict(
    State(state): State<AppState>,
    Json(raw): Json<RawRecord>,
) -> ApiResult<Json<PredictResponse>> {
    let started = Instant::now();
    let tx_id = raw.transaction_id.clone().unwrap_or_default();

    match state.pipeline.score(&raw) {
        Ok(result) => {
            let processing_time = started.elapsed();
            state.metrics.record_score(processing_time, &result);

            if result.is_fraud {
                info!(
                    transaction_id = %tx_id,
                    risk_score = result.probability,
                    risk_level = result.risk_tier.as_str(),
                    processing_time_us = processing_time.as_micros(),
                    "Transaction flagged as fraud"
                );
            } else {
                debug!(
                    transaction_id = %tx_id,
                    risk_score = result.probability,
                    processing_time_us = processing_time.as_micros(),
                    "Transaction scored (below threshold)"
                );
            }

            Ok(Json(PredictResponse::build(&result)))
        }
        Err(e) => {
            state.metrics.record_failure();
            Err(e.into())
        }
    }
}

/// Score a batch of transaction records with per-record failure isolation
pub async fn batch_predict(
    State(state): State<AppState>,
    Json(request): Json<BatchPredictRequest>,
) -> ApiResult<Json<BatchPredictResponse>> {
    let started = Instant::now();

    let batch = state.pipeline.score_batch(&request.transactions).map_err(|e| {
        state.metrics.record_failure();
        crate::server::ApiError::from(e)
    })?;

    let per_record = started.elapsed() / batch.total.max(1) as u32;
    for outcome in &batch.outcomes {
        match outcome {
            RecordOutcome::Scored { result, .. } => state.metrics.record_score(per_record, result),
            RecordOutcome::Failed { .. } => state.metrics.record_failure(),
        }
    }

    debug!(
        total = batch.total,
        fraud_detected = batch.fraud_detected,
        failed = batch.failed,
        "Batch scored"
    );

    Ok(Json(BatchPredictResponse::build(&batch)))
}

/// Metadata about the loaded classifier
pub async fn model_info(State(state): State<AppState>) -> ApiResult<Json<ModelInfoResponse>> {
    let schema = state.pipeline.schema().ok_or(ScoringError::Unavailable)?;
    Ok(Json(ModelInfoResponse::from_schema(schema)))
}

/// Liveness check; reports whether a classifier is loaded
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::current(state.pipeline.is_ready()))
}
