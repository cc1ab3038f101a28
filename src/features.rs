//! Feature assembly
//!
//! Turns a validated transaction record into the fixed-order numeric vector
//! the classifier was trained on. The column order is a hard contract with
//! the trained model; getting it wrong produces silently wrong scores, so
//! the shipped schema descriptor is checked against it at startup.

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::types::TransactionRecord;

/// Classifier input columns, in training order.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "amount",
    "transaction_hour",
    "device_trust_score",
    "velocity_last_24h",
    "cardholder_age",
    "merchant_category",
    "foreign_transaction",
    "location_mismatch",
];

/// Ordinal code for merchant categories the encoder never saw at training
/// time. Matches the encoder's configured unknown-value sentinel.
pub const UNKNOWN_CATEGORY_CODE: f32 = -1.0;

fn unknown_label() -> String {
    "unknown".to_string()
}

/// Schema descriptor shipped alongside the classifier artifact.
///
/// `columns` is the ordered input column list the model was trained on and
/// `merchant_categories` lists the category labels in ordinal-code order.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSchema {
    #[serde(alias = "all_features")]
    pub columns: Vec<String>,
    pub merchant_categories: Vec<String>,
    #[serde(default = "unknown_label")]
    pub model_type: String,
    #[serde(default = "unknown_label")]
    pub version: String,
}

/// One classifier input row, ordered per [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

/// Maps validated records into feature vectors using the encoding captured
/// in the schema descriptor.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    category_codes: HashMap<String, f32>,
}

impl FeatureAssembler {
    /// Builds an assembler for the given schema descriptor.
    ///
    /// Fails when the descriptor's column list disagrees with the compiled-in
    /// order; starting up against a reordered schema would mis-assign every
    /// feature.
    pub fn for_schema(schema: &FeatureSchema) -> Result<Self> {
        if !schema.columns.iter().map(String::as_str).eq(FEATURE_COLUMNS) {
            bail!(
                "schema descriptor column order [{}] does not match classifier input order [{}]",
                schema.columns.join(", "),
                FEATURE_COLUMNS.join(", ")
            );
        }

        let category_codes = schema
            .merchant_categories
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as f32))
            .collect();

        Ok(Self { category_codes })
    }

    /// Encodes a validated record into the classifier's input row.
    /// Never fails; unseen categories map to [`UNKNOWN_CATEGORY_CODE`].
    pub fn assemble(&self, record: &TransactionRecord) -> FeatureVector {
        FeatureVector(vec![
            record.amount as f32,
            f32::from(record.transaction_hour),
            f32::from(record.device_trust_score),
            record.velocity_last_24h as f32,
            record.cardholder_age as f32,
            self.category_code(&record.merchant_category),
            f32::from(u8::from(record.foreign_transaction)),
            f32::from(u8::from(record.location_mismatch)),
        ])
    }

    fn category_code(&self, label: &str) -> f32 {
        self.category_codes
            .get(label)
            .copied()
            .unwrap_or(UNKNOWN_CATEGORY_CODE)
    }
}
