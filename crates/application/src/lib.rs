mod constants;
mod error;
mod recognition;
mod settings;

pub use constants::*;
pub use error::{RecognitionError, Result};
pub use recognition::{
    FrameOutcome, Prediction, PredictionHistory, RecognitionSession, SentenceBuilder,
    StabilityVoter, VoteStrategy, WindowBuffer,
};
pub use settings::RecognitionSettings;
