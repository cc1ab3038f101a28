//! Transaction record types for risk scoring

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound transaction record as received from the transport, before
/// validation.
///
/// Every scoring field is optional and loosely typed so that the validator,
/// not the deserializer, owns the required-field and coercion rules and can
/// report them deterministically. Unknown extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Opaque correlation id, only echoed back in batch results
    #[serde(default)]
    pub transaction_id: Option<String>,

    #[serde(default)]
    pub amount: Option<Value>,

    #[serde(default)]
    pub transaction_hour: Option<Value>,

    #[serde(default)]
    pub merchant_category: Option<Value>,

    #[serde(default)]
    pub foreign_transaction: Option<Value>,

    #[serde(default)]
    pub location_mismatch: Option<Value>,

    #[serde(default)]
    pub device_trust_score: Option<Value>,

    #[serde(default)]
    pub velocity_last_24h: Option<Value>,

    #[serde(default)]
    pub cardholder_age: Option<Value>,
}

/// A validated transaction record, immutable for the rest of the pipeline.
///
/// Only the validator constructs these; every field already conforms to its
/// stated type and range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Opaque correlation id, not used in scoring
    pub transaction_id: Option<String>,

    /// Transaction amount, non-negative
    pub amount: f64,

    /// Hour of day the transaction occurred (0-23)
    pub transaction_hour: u8,

    /// Merchant category label; unseen labels are tolerated and encoded
    /// downstream through the training-time categorical encoder
    pub merchant_category: String,

    /// Cardholder age in years
    pub cardholder_age: u32,

    /// Device trust score (0-100)
    pub device_trust_score: u8,

    /// Number of transactions on the card in the last 24 hours
    pub velocity_last_24h: u32,

    /// Whether the transaction was made abroad
    pub foreign_transaction: bool,

    /// Whether the transaction location deviates from the cardholder's
    /// expected location
    pub location_mismatch: bool,
}

impl TransactionRecord {
    /// The canonical legitimate sample used in acceptance checks.
    pub fn sample_legitimate() -> Self {
        Self {
            transaction_id: None,
            amount: 45.50,
            transaction_hour: 14,
            merchant_category: "Grocery".to_string(),
            cardholder_age: 35,
            device_trust_score: 85,
            velocity_last_24h: 2,
            foreign_transaction: false,
            location_mismatch: false,
        }
    }

    /// The canonical suspicious sample used in acceptance checks.
    pub fn sample_suspicious() -> Self {
        Self {
            transaction_id: None,
            amount: 1500.00,
            transaction_hour: 3,
            merchant_category: "Electronics".to_string(),
            cardholder_age: 22,
            device_trust_score: 25,
            velocity_last_24h: 8,
            foreign_transaction: true,
            location_mismatch: true,
        }
    }
}
