//! Classifier contract for keypoint sequences.
//!
//! A classifier takes one full window of keypoint vectors and returns one
//! probability per label, in the label order the model was trained with.

mod distribution;
mod labels;
mod scripted;

pub use distribution::PredictionDistribution;
pub use labels::{Label, LabelSet};
pub use scripted::ScriptedClassifier;

use handsign_keypoints::KeypointVector;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model not loaded")]
    ModelNotLoaded,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid label set: {0}")]
    InvalidLabelSet(String),
    #[error("classifier returned {actual} probabilities for {expected} labels")]
    LabelCountMismatch { expected: usize, actual: usize },
    #[error("probability {value} for label '{label}' is outside [0, 1]")]
    InvalidProbability { label: String, value: f32 },
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

pub trait SequenceClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of labels the model was trained against, when the model reports it.
    fn label_count(&self) -> Option<usize> {
        None
    }

    /// Classify one full window, oldest frame first.
    fn classify(&self, window: &[KeypointVector]) -> Result<Vec<f32>>;
}
