//! Scoring pipeline
//!
//! Drives one record through validation, feature assembly, classification
//! and tier mapping, and folds per-record outcomes into batch results.
//! The pipeline holds no mutable state; the classifier it carries is loaded
//! once at startup and read-only afterwards.

use crate::error::ScoringError;
use crate::features::FeatureSchema;
use crate::model::LoadedModel;
use crate::types::{
    BatchResult, RawRecord, RecordOutcome, ScoreResult, ScoringPolicy, TransactionRecord,
};
use crate::validate::validate;

pub struct ScoringPipeline {
    model: Option<LoadedModel>,
    policy: ScoringPolicy,
}

impl ScoringPipeline {
    pub fn new(model: Option<LoadedModel>, policy: ScoringPolicy) -> Self {
        Self { model, policy }
    }

    /// Whether a classifier is loaded and scoring calls can succeed.
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Schema descriptor of the loaded classifier, if any.
    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.model.as_ref().map(|m| &m.schema)
    }

    /// Validates and scores one inbound record.
    ///
    /// An unloaded classifier is reported before any validation runs; there
    /// is no point rejecting a payload field by field when no record could
    /// score anyway.
    pub fn score(&self, raw: &RawRecord) -> Result<ScoreResult, ScoringError> {
        let model = self.model.as_ref().ok_or(ScoringError::Unavailable)?;
        let record = validate(raw)?;
        self.score_validated(model, &record)
    }

    /// Scores an already-validated record.
    pub fn score_record(&self, record: &TransactionRecord) -> Result<ScoreResult, ScoringError> {
        let model = self.model.as_ref().ok_or(ScoringError::Unavailable)?;
        self.score_validated(model, record)
    }

    fn score_validated(
        &self,
        model: &LoadedModel,
        record: &TransactionRecord,
    ) -> Result<ScoreResult, ScoringError> {
        let vector = model.assembler.assemble(record);
        let probability = model
            .classifier
            .predict_probability(&vector)
            .map_err(|e| ScoringError::internal(e.to_string()))?;
        Ok(ScoreResult::from_probability(probability, &self.policy))
    }

    /// Scores a batch of records with per-record failure isolation.
    ///
    /// A failing record becomes an error outcome at its position and the
    /// rest of the batch continues; only an unloaded classifier fails the
    /// batch as a whole. Outcomes preserve input order.
    pub fn score_batch(&self, records: &[RawRecord]) -> Result<BatchResult, ScoringError> {
        if self.model.is_none() {
            return Err(ScoringError::Unavailable);
        }

        let outcomes = records
            .iter()
            .map(|raw| match self.score(raw) {
                Ok(result) => RecordOutcome::Scored {
                    transaction_id: raw.transaction_id.clone(),
                    result,
                },
                Err(e) => RecordOutcome::Failed {
                    transaction_id: raw.transaction_id.clone(),
                    error: e.to_string(),
                },
            })
            .collect();

        Ok(BatchResult::from_outcomes(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::features::{FeatureAssembler, FeatureVector};
    use crate::model::Classifier;
    use crate::types::RiskTier;
    use anyhow::bail;
    use serde_json::json;
    use std::sync::Arc;

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn predict_probability(&self, _features: &FeatureVector) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn predict_probability(&self, _features: &FeatureVector) -> anyhow::Result<f64> {
            bail!("tensor shape mismatch")
        }
    }

    fn schema() -> FeatureSchema {
        serde_json::from_str(
            r#"{
                "columns": ["amount", "transaction_hour", "device_trust_score",
                            "velocity_last_24h", "cardholder_age", "merchant_category",
                            "foreign_transaction", "location_mismatch"],
                "merchant_categories": ["Clothing", "Electronics", "Food", "Grocery", "Travel"],
                "model_type": "GradientBoostingClassifier",
                "version": "1.0.0"
            }"#,
        )
        .unwrap()
    }

    fn pipeline_with(classifier: Arc<dyn Classifier>) -> ScoringPipeline {
        let schema = schema();
        let assembler = FeatureAssembler::for_schema(&schema).unwrap();
        ScoringPipeline::new(
            Some(LoadedModel {
                classifier,
                schema,
                assembler,
            }),
            ScoringPolicy::default(),
        )
    }

    fn raw(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    fn complete(id: Option<&str>) -> serde_json::Value {
        let mut payload = json!({
            "amount": 45.5,
            "transaction_hour": 14,
            "merchant_category": "Grocery",
            "foreign_transaction": 0,
            "location_mismatch": 0,
            "device_trust_score": 85,
            "velocity_last_24h": 2,
            "cardholder_age": 35
        });
        if let Some(id) = id {
            payload["transaction_id"] = json!(id);
        }
        payload
    }

    #[test]
    fn test_scores_valid_record() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.85)));
        let result = pipeline.score(&raw(complete(None))).unwrap();

        assert_eq!(result.probability, 0.85);
        assert!(result.is_fraud);
        assert_eq!(result.risk_tier, RiskTier::High);
        assert!((result.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.27)));
        let first = pipeline.score(&raw(complete(None))).unwrap();
        let second = pipeline.score(&raw(complete(None))).unwrap();
        assert_eq!(first.probability.to_bits(), second.probability.to_bits());
    }

    #[test]
    fn test_unloaded_classifier_reported_before_validation() {
        let pipeline = ScoringPipeline::new(None, ScoringPolicy::default());
        // even an empty record reports unavailability, not a missing field
        let err = pipeline.score(&RawRecord::default()).unwrap_err();
        assert_eq!(err, ScoringError::Unavailable);
    }

    #[test]
    fn test_validation_error_propagates() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.5)));
        let mut payload = complete(None);
        payload.as_object_mut().unwrap().remove("amount");

        let err = pipeline.score(&raw(payload)).unwrap_err();
        assert_eq!(
            err,
            ScoringError::Validation(ValidationError::MissingField("amount"))
        );
        assert_eq!(err.to_string(), "Missing required field: amount");
    }

    #[test]
    fn test_classifier_failure_is_internal_error() {
        let pipeline = pipeline_with(Arc::new(BrokenClassifier));
        let err = pipeline.score(&raw(complete(None))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Prediction failed: tensor shape mismatch"
        );
    }

    #[test]
    fn test_batch_isolates_per_record_failures() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.9)));

        let mut broken = complete(Some("T002"));
        broken.as_object_mut().unwrap().remove("cardholder_age");

        let records = vec![
            raw(complete(Some("T001"))),
            raw(broken),
            raw(complete(Some("T003"))),
        ];

        let batch = pipeline.score_batch(&records).unwrap();
        assert_eq!(batch.total, 3);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.fraud_detected, 2);

        assert_eq!(batch.outcomes[0].transaction_id(), Some("T001"));
        assert!(matches!(
            &batch.outcomes[1],
            RecordOutcome::Failed { transaction_id, error }
                if transaction_id.as_deref() == Some("T002")
                    && error == "Missing required field: cardholder_age"
        ));
        assert_eq!(batch.outcomes[2].transaction_id(), Some("T003"));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.9)));
        let batch = pipeline.score_batch(&[]).unwrap();
        assert_eq!(batch.total, 0);
        assert_eq!(batch.fraud_detected, 0);
        assert_eq!(batch.failed, 0);
        assert!(batch.outcomes.is_empty());
    }

    #[test]
    fn test_batch_without_classifier_fails_whole() {
        let pipeline = ScoringPipeline::new(None, ScoringPolicy::default());
        let err = pipeline.score_batch(&[raw(complete(None))]).unwrap_err();
        assert_eq!(err, ScoringError::Unavailable);
    }

    #[test]
    fn test_batch_and_single_agree() {
        let pipeline = pipeline_with(Arc::new(FixedClassifier(0.61)));
        let record = raw(complete(Some("T010")));

        let single = pipeline.score(&record).unwrap();
        let batch = pipeline.score_batch(std::slice::from_ref(&record)).unwrap();

        match &batch.outcomes[0] {
            RecordOutcome::Scored { result, .. } => {
                assert_eq!(result.probability, single.probability);
                assert_eq!(result.is_fraud, single.is_fraud);
                assert_eq!(result.risk_tier, single.risk_tier);
            }
            other => panic!("expected scored outcome, got {:?}", other),
        }
    }
}
