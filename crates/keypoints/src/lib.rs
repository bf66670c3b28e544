//! Hand landmark data model and the fixed-length keypoint encoding fed to
//! sequence classifiers.

mod encoder;
mod extractor;
mod landmark;

pub use encoder::{decode_slot, encode, encode_frame, KeypointVector, KEYPOINT_VECTOR_LEN, SLOT_LEN};
pub use extractor::KeypointExtractor;
pub use landmark::{HandDetection, LandmarkPoint, HAND_LANDMARK_COUNT, MAX_HANDS};

#[derive(Debug, thiserror::Error)]
pub enum KeypointError {
    #[error("hand detection has {0} landmarks, expected 21")]
    LandmarkCount(usize),
    #[error("frame has {0} hand detections, at most 2 are supported")]
    TooManyHands(usize),
    #[error("extraction failed: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, KeypointError>;
