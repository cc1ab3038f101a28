//! ONNX Runtime classifier

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::{debug, info};

use crate::features::FeatureVector;
use crate::model::Classifier;

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` takes the session mutably, so inference calls are
/// serialized behind a mutex; scoring itself stays pure per call.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Loads a classifier artifact from disk.
    ///
    /// Input and output names are discovered from the session metadata; the
    /// probability output is picked by name, with the last output as a
    /// fallback for exports that name it differently.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;

        info!(path = %path.display(), threads = onnx_threads, "Loading classifier artifact");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Classifier artifact loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.as_slice().to_vec()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Classifier session lock poisoned: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        let probability = extract_probability(&outputs, &self.output_name)?;
        Ok(probability.clamp(0.0, 1.0))
    }
}

/// Extract the positive-class probability from session outputs.
/// Handles both tensor outputs (gradient boosting, random forest exports)
/// and seq(map) outputs used by some converters.
fn extract_probability(outputs: &ort::session::SessionOutputs, output_name: &str) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            if let Some(prob) = probability_from_tensor(&dims, data) {
                debug!(output = %output_name, prob = prob, "Extracted from tensor");
                return Ok(prob);
            }
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = probability_from_sequence_map(output) {
                return Ok(prob);
            }
        }
    }

    // Exports sometimes name outputs unexpectedly; scan everything except
    // the label output before giving up
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            if let Some(prob) = probability_from_tensor(&dims, data) {
                debug!(output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = probability_from_sequence_map(&output) {
                return Ok(prob);
            }
        }
    }

    bail!("No probability output found in classifier response")
}

/// Extract probability from seq(map(int64, float)) output format.
fn probability_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or_else(|| anyhow!("Empty sequence output"))?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(f64::from(*prob));
        }
    }
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - f64::from(*prob));
        }
    }

    bail!("No class probability found in map output")
}

/// Pick the positive-class probability out of a probability tensor.
/// Expects batch size 1; `[1, 2]` and `[2]` carry per-class probabilities,
/// `[1, 1]` and `[1]` a single positive-class score.
fn probability_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let value = match dims {
        [_, classes] if *classes >= 2 => data.get(1),
        [_, 1] => data.first(),
        [classes] if *classes >= 2 => data.get(1),
        [1] => data.first(),
        _ => data.last(),
    };
    value.map(|&v| f64::from(v))
}
