//! ONNX Runtime backend for keypoint-sequence classifiers.
//!
//! Expects a model exported from a recurrent network with a single input of
//! shape `[batch, frames, 126]` and a single output of shape `[batch, labels]`
//! holding softmax probabilities.

use handsign_classifier::{ClassifierError, SequenceClassifier};
use handsign_keypoints::{KeypointVector, KEYPOINT_VECTOR_LEN};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LstmError {
    #[error("failed to load model: {0}")]
    Model(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Debug)]
pub struct LstmClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    label_count: Option<usize>,
}

impl LstmClassifier {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, LstmError> {
        let model_path = model_path.as_ref();

        let session = Session::builder()
            .map_err(|e| LstmError::Model(e.to_string()))?
            .with_parallel_execution(false)
            .map_err(|e| LstmError::Model(e.to_string()))?
            .with_inter_threads(1)
            .map_err(|e| LstmError::Model(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| LstmError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| LstmError::Model(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| LstmError::Model(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| LstmError::Model("model has no inputs".to_string()))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| LstmError::Model("model has no outputs".to_string()))?;

        let label_count = session
            .outputs
            .first()
            .and_then(|o| o.output_type.tensor_shape())
            .and_then(|shape| label_count_from_shape(shape));

        tracing::info!(
            path = %model_path.display(),
            input = %input_name,
            output = %output_name,
            ?label_count,
            "Loaded sequence classifier"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            label_count,
        })
    }

    pub fn predict(&self, window: &[KeypointVector]) -> Result<Vec<f32>, LstmError> {
        if window.is_empty() {
            return Err(LstmError::Inference("empty window".to_string()));
        }

        let input = Tensor::from_array((
            [1i64, window.len() as i64, KEYPOINT_VECTOR_LEN as i64],
            flatten_window(window),
        ))
        .map_err(|e| LstmError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| LstmError::Inference("lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| LstmError::Inference(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| LstmError::Inference("missing model output".to_string()))?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| LstmError::Inference(e.to_string()))?;

        if data.is_empty() {
            return Err(LstmError::Inference("empty output".to_string()));
        }
        Ok(data.to_vec())
    }
}

impl SequenceClassifier for LstmClassifier {
    fn name(&self) -> &'static str {
        "lstm-onnx"
    }

    fn label_count(&self) -> Option<usize> {
        self.label_count
    }

    fn classify(&self, window: &[KeypointVector]) -> Result<Vec<f32>, ClassifierError> {
        self.predict(window)
            .map_err(|e| ClassifierError::Inference(e.to_string()))
    }
}

/// Label count from a `[batch, labels]` output shape. Dynamic (negative)
/// dimensions report nothing.
fn label_count_from_shape(shape: &[i64]) -> Option<usize> {
    shape
        .last()
        .copied()
        .filter(|&dim| dim > 0)
        .map(|dim| dim as usize)
}

/// Row-major `[frames x 126]` copy of the window, oldest frame first.
fn flatten_window(window: &[KeypointVector]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(window.len() * KEYPOINT_VECTOR_LEN);
    for frame in window {
        flat.extend_from_slice(frame.as_slice());
    }
    flat
}
