//! Transport payloads
//!
//! Builds the JSON bodies the API serves from pipeline outcomes, attaching
//! a generation timestamp. `is_fraud` is serialized as 0/1 for compatibility
//! with existing consumers of the API.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::features::FeatureSchema;
use crate::types::{BatchResult, RecordOutcome, RiskTier, ScoreResult};

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Body of a successful `POST /api/predict`.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub is_fraud: u8,
    pub fraud_probability: f64,
    pub risk_level: RiskTier,
    pub confidence: f64,
    pub timestamp: String,
}

impl PredictResponse {
    pub fn build(result: &ScoreResult) -> Self {
        Self {
            is_fraud: u8::from(result.is_fraud),
            fraud_probability: result.probability,
            risk_level: result.risk_tier,
            confidence: result.confidence,
            timestamp: now_iso8601(),
        }
    }
}

/// One row of a batch response: either a scored record or its error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchRow {
    Scored {
        #[serde(skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
        is_fraud: u8,
        fraud_probability: f64,
        risk_level: RiskTier,
        confidence: f64,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
        error: String,
    },
}

impl From<&RecordOutcome> for BatchRow {
    fn from(outcome: &RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Scored {
                transaction_id,
                result,
            } => BatchRow::Scored {
                transaction_id: transaction_id.clone(),
                is_fraud: u8::from(result.is_fraud),
                fraud_probability: result.probability,
                risk_level: result.risk_tier,
                confidence: result.confidence,
            },
            RecordOutcome::Failed {
                transaction_id,
                error,
            } => BatchRow::Failed {
                transaction_id: transaction_id.clone(),
                error: error.clone(),
            },
        }
    }
}

/// Body of a successful `POST /api/batch_predict`.
#[derive(Debug, Serialize)]
pub struct BatchPredictResponse {
    pub total_transactions: usize,
    pub fraud_detected: usize,
    pub failed: usize,
    pub predictions: Vec<BatchRow>,
    pub timestamp: String,
}

impl BatchPredictResponse {
    pub fn build(batch: &BatchResult) -> Self {
        Self {
            total_transactions: batch.total,
            fraud_detected: batch.fraud_detected,
            failed: batch.failed,
            predictions: batch.outcomes.iter().map(BatchRow::from).collect(),
            timestamp: now_iso8601(),
        }
    }
}

/// Body of `GET /api/model_info`.
#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_type: String,
    pub features: Vec<String>,
    pub status: &'static str,
    pub version: String,
}

impl ModelInfoResponse {
    pub fn from_schema(schema: &FeatureSchema) -> Self {
        Self {
            model_type: schema.model_type.clone(),
            features: schema.columns.clone(),
            status: "active",
            version: schema.version.clone(),
        }
    }
}

/// Body of `GET /health`. Served with 200 whether or not a classifier is
/// loaded; `model_loaded` carries the difference.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn current(model_loaded: bool) -> Self {
        Self {
            status: "healthy",
            model_loaded,
            timestamp: now_iso8601(),
        }
    }
}
