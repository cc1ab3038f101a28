//! Risk tiers and scoring outcomes

use serde::{Deserialize, Serialize};

/// Risk tier assigned to a scored transaction.
///
/// Serialized in upper case on the wire (`"LOW"`, `"MEDIUM"`, `"HIGH"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Maps a fraud probability onto a tier. Cutoffs are lower-inclusive:
    /// a probability equal to a cutoff lands in the higher tier.
    pub fn from_probability(probability: f64, thresholds: &TierThresholds) -> Self {
        if probability >= thresholds.high {
            RiskTier::High
        } else if probability >= thresholds.medium {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

/// Probability cutoffs between risk tiers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Probabilities at or above this value are at least MEDIUM
    pub medium: f64,
    /// Probabilities at or above this value are HIGH
    pub high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 0.30,
            high: 0.70,
        }
    }
}

/// Tunable scoring parameters, loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Probabilities at or above this value are flagged as fraud
    pub decision_threshold: f64,
    pub tiers: TierThresholds,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            decision_threshold: 0.5,
            tiers: TierThresholds::default(),
        }
    }
}

/// How far the fraud probability sits from the decision boundary,
/// expressed as `max(p, 1 - p)`. Always in `[0.5, 1.0]`.
pub fn confidence(probability: f64) -> f64 {
    probability.max(1.0 - probability)
}

/// The complete scoring outcome for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub probability: f64,
    pub is_fraud: bool,
    pub risk_tier: RiskTier,
    pub confidence: f64,
}

impl ScoreResult {
    /// Derives the full outcome from a raw classifier probability.
    pub fn from_probability(probability: f64, policy: &ScoringPolicy) -> Self {
        Self {
            probability,
            is_fraud: probability >= policy.decision_threshold,
            risk_tier: RiskTier::from_probability(probability, &policy.tiers),
            confidence: confidence(probability),
        }
    }
}

/// Per-record outcome inside a batch. Failed records carry the error text
/// instead of aborting the rest of the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Scored {
        transaction_id: Option<String>,
        result: ScoreResult,
    },
    Failed {
        transaction_id: Option<String>,
        error: String,
    },
}

impl RecordOutcome {
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            RecordOutcome::Scored { transaction_id, .. }
            | RecordOutcome::Failed { transaction_id, .. } => transaction_id.as_deref(),
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(
            self,
            RecordOutcome::Scored {
                result: ScoreResult { is_fraud: true, .. },
                ..
            }
        )
    }
}

/// Aggregated outcome of a batch scoring request. Outcomes preserve the
/// input order of the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub outcomes: Vec<RecordOutcome>,
    pub total: usize,
    pub fraud_detected: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn from_outcomes(outcomes: Vec<RecordOutcome>) -> Self {
        let total = outcomes.len();
        let fraud_detected = outcomes.iter().filter(|o| o.is_fraud()).count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Failed { .. }))
            .count();
        Self {
            outcomes,
            total,
            fraud_detected,
            failed,
        }
    }
}
