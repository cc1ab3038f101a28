//! Type definitions for the scoring service

pub mod record;
pub mod score;

pub use record::{RawRecord, TransactionRecord};
pub use score::{
    confidence, BatchResult, RecordOutcome, RiskTier, ScoreResult, ScoringPolicy, TierThresholds,
};
