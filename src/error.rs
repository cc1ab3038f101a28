//! Error types for the scoring pipeline

use thiserror::Error;

/// Validation failure for a single inbound record.
///
/// Exactly one violation is reported per record: the first missing field in
/// the fixed required-field order, or the first type/range violation in
/// feature-column order. Display strings are the wire-facing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is absent from the record
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but cannot be coerced to its expected type
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A field coerced successfully but violates its stated range
    #[error("Value for '{field}' is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

impl ValidationError {
    /// Create a new invalid-field error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Create a new out-of-range error
    pub fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            reason: reason.into(),
        }
    }

    /// The field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::InvalidField { field, .. } => field,
            Self::OutOfRange { field, .. } => field,
        }
    }
}

/// Failure of a scoring call as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// No classifier artifact was loaded at startup; scoring is disabled
    /// for the lifetime of the process
    #[error("Model not loaded. Scoring is disabled until the service is restarted with a valid classifier artifact.")]
    Unavailable,

    /// The record failed validation before reaching the classifier
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unexpected failure inside feature assembly or classifier inference
    #[error("Prediction failed: {0}")]
    Internal(String),
}

impl ScoringError {
    /// Create a new internal scoring error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
