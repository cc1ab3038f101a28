//! Fraud Scoring Service Library
//!
//! Real-time risk scoring of financial transactions against a pre-trained
//! binary classifier, exposed as a JSON HTTP API with single and batch
//! scoring, risk tier mapping, and per-record failure isolation in batches.

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod types;
pub mod validate;

pub use config::AppConfig;
pub use error::{ScoringError, ValidationError};
pub use pipeline::ScoringPipeline;
pub use types::{RawRecord, RiskTier, ScoreResult, TransactionRecord};
