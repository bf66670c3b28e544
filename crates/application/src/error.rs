use handsign_classifier::ClassifierError;
use handsign_keypoints::KeypointError;

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// Settings or label set do not match the classifier. Not recoverable at runtime.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An extractor or classifier returned data outside its contract.
    #[error("adapter contract violation: {0}")]
    AdapterContract(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RecognitionError {
    /// Whether the session must stop rather than skip the offending frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<KeypointError> for RecognitionError {
    fn from(e: KeypointError) -> Self {
        RecognitionError::AdapterContract(e.to_string())
    }
}

impl From<ClassifierError> for RecognitionError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::LabelCountMismatch { .. } | ClassifierError::InvalidLabelSet(_) => {
                RecognitionError::Configuration(e.to_string())
            }
            _ => RecognitionError::AdapterContract(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecognitionError>;
