//! Startup loading of the classifier artifact and its schema descriptor

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::features::{FeatureAssembler, FeatureSchema};
use crate::model::{LoadedModel, OnnxClassifier};

/// Loads the classifier artifact and schema descriptor once at startup.
///
/// A missing or unreadable artifact or descriptor is not fatal: the service
/// starts with scoring disabled (`Ok(None)`) and every scoring call reports
/// the classifier as unavailable. A descriptor that loads but disagrees with
/// the compiled-in feature column order IS fatal; scoring against it would
/// produce silently wrong results.
pub fn load_scoring_model<P: AsRef<Path>>(
    model_path: P,
    schema_path: P,
    onnx_threads: usize,
) -> Result<Option<LoadedModel>> {
    let schema = match read_schema(schema_path.as_ref()) {
        Some(schema) => schema,
        None => return Ok(None),
    };

    let assembler = FeatureAssembler::for_schema(&schema)?;

    let classifier = match OnnxClassifier::load(model_path.as_ref(), onnx_threads) {
        Ok(classifier) => classifier,
        Err(e) => {
            warn!(
                path = %model_path.as_ref().display(),
                error = %e,
                "Classifier artifact not loadable; starting with scoring disabled"
            );
            return Ok(None);
        }
    };

    info!(
        model_type = %schema.model_type,
        version = %schema.version,
        features = schema.columns.len(),
        categories = schema.merchant_categories.len(),
        "Scoring model ready"
    );

    Ok(Some(LoadedModel {
        classifier: Arc::new(classifier),
        schema,
        assembler,
    }))
}

fn read_schema(path: &Path) -> Option<FeatureSchema> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Schema descriptor not readable; starting with scoring disabled"
            );
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(schema) => Some(schema),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Schema descriptor not parseable; starting with scoring disabled"
            );
            None
        }
    }
}
