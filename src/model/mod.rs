//! Classifier adapter and model state
//!
//! The classifier is loaded once at startup and is immutable for the life of
//! the process. A missing or unloadable artifact leaves the service running
//! with scoring disabled; swapping in a new artifact requires a restart.

pub mod loader;
pub mod onnx;

use std::sync::Arc;

use anyhow::Result;

use crate::features::{FeatureAssembler, FeatureSchema, FeatureVector};

pub use loader::load_scoring_model;
pub use onnx::OnnxClassifier;

/// A pre-trained binary risk classifier.
///
/// Implementations return the probability of the positive (fraud) class for
/// one feature vector. The model family behind the trait is opaque to the
/// pipeline.
pub trait Classifier: Send + Sync {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64>;
}

/// The classifier artifact together with the schema it was trained against.
pub struct LoadedModel {
    pub classifier: Arc<dyn Classifier>,
    pub schema: FeatureSchema,
    pub assembler: FeatureAssembler,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("schema", &self.schema)
            .field("assembler", &self.assembler)
            .finish_non_exhaustive()
    }
}
