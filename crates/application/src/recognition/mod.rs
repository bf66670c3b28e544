//! Streaming gesture recognition over per-frame hand detections.
//!
//! This module turns a stream of frames into committed gesture labels:
//! - Keypoint encoding of each frame's detections
//! - A sliding window of encoded frames fed to the classifier
//! - A stability vote over recent predictions
//! - A bounded, de-duplicated sentence of committed labels

mod sentence;
mod voter;
mod window_buffer;

pub use sentence::SentenceBuilder;
pub use voter::{PredictionHistory, StabilityVoter, VoteStrategy};
pub use window_buffer::WindowBuffer;

use std::sync::Arc;

use handsign_classifier::{Label, LabelSet, PredictionDistribution, SequenceClassifier};
use handsign_keypoints::{encode_frame, HandDetection, KeypointExtractor, KeypointVector};

use crate::settings::RecognitionSettings;
use crate::{RecognitionError, Result};

/// Result of classifying one full window.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Most probable label for the window.
    pub label: Label,
    pub probability: f32,
    /// Label that passed the stability vote, if any.
    pub committed: Option<Label>,
    /// Whether the commit changed the sentence (false for immediate repeats).
    pub sentence_changed: bool,
}

/// What happened to one frame.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// Window not yet full; the classifier was not invoked.
    Buffering { frames: usize, capacity: usize },
    Classified(Prediction),
}

impl FrameOutcome {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            Self::Classified(p) => Some(p),
            Self::Buffering { .. } => None,
        }
    }

    pub fn committed(&self) -> Option<&Label> {
        self.prediction().and_then(|p| p.committed.as_ref())
    }
}

/// Per-session recognition context.
///
/// Owns the window, prediction history and sentence; nothing else mutates
/// them. Frames must be fed in arrival order.
pub struct RecognitionSession {
    settings: RecognitionSettings,
    labels: LabelSet,
    classifier: Arc<dyn SequenceClassifier>,
    window: WindowBuffer,
    voter: StabilityVoter,
    sentence: SentenceBuilder,
    latest: Option<PredictionDistribution>,
    frames_processed: u64,
    windows_classified: u64,
}

impl RecognitionSession {
    /// Create a session, failing if the settings are invalid or the classifier
    /// reports a label count different from the configured label set.
    pub fn new(
        settings: RecognitionSettings,
        classifier: Arc<dyn SequenceClassifier>,
    ) -> Result<Self> {
        let labels = settings.validate()?;

        if let Some(count) = classifier.label_count() {
            if count != labels.len() {
                return Err(RecognitionError::Configuration(format!(
                    "classifier '{}' has {} outputs but {} labels are configured",
                    classifier.name(),
                    count,
                    labels.len()
                )));
            }
        }

        tracing::debug!(
            classifier = classifier.name(),
            window_size = settings.window_size,
            history_size = settings.history_size,
            sentence_cap = settings.sentence_cap,
            strategy = settings.vote_strategy.as_str(),
            "Created recognition session"
        );

        Ok(Self {
            window: WindowBuffer::new(settings.window_size),
            voter: StabilityVoter::new(
                settings.history_size,
                settings.confidence_threshold,
                settings.vote_strategy,
            ),
            sentence: SentenceBuilder::new(settings.sentence_cap),
            settings,
            labels,
            classifier,
            latest: None,
            frames_processed: 0,
            windows_classified: 0,
        })
    }

    // --- Frame processing ---

    /// Run one frame through encoding, buffering, classification and voting.
    pub fn process_frame(&mut self, detections: &[HandDetection]) -> Result<FrameOutcome> {
        let Some(window) = self.ingest(detections)? else {
            return Ok(self.buffering());
        };
        let probabilities = self.classifier.classify(&window)?;
        self.apply_prediction(probabilities)
    }

    /// Extract detections from a raw frame and process them.
    pub fn process_with<E: KeypointExtractor>(
        &mut self,
        extractor: &mut E,
        frame: &E::Frame,
    ) -> Result<FrameOutcome> {
        let detections = extractor.extract(frame)?;
        self.process_frame(&detections)
    }

    /// Encode and buffer one frame.
    ///
    /// Returns a copy of the window when it is full and ready for the
    /// classifier. Pair with [`apply_prediction`](Self::apply_prediction) to
    /// run classification elsewhere.
    pub fn ingest(&mut self, detections: &[HandDetection]) -> Result<Option<Vec<KeypointVector>>> {
        let vector = encode_frame(detections)?;
        self.window.push(vector);
        self.frames_processed += 1;

        if self.window.is_full() {
            Ok(Some(self.window.snapshot()))
        } else {
            Ok(None)
        }
    }

    /// Feed classifier output for the most recent full window.
    ///
    /// The output is validated before any state changes; on error the history
    /// and sentence are untouched.
    pub fn apply_prediction(&mut self, probabilities: Vec<f32>) -> Result<FrameOutcome> {
        let dist = PredictionDistribution::new(self.labels.clone(), probabilities)?;

        let label = dist.argmax();
        let probability = dist.probability(label.index()).unwrap_or(0.0);
        let committed = self.voter.observe(&dist);
        let sentence_changed = committed
            .clone()
            .map(|l| self.sentence.commit(l))
            .unwrap_or(false);

        self.windows_classified += 1;
        self.latest = Some(dist);

        Ok(FrameOutcome::Classified(Prediction {
            label,
            probability,
            committed,
            sentence_changed,
        }))
    }

    fn buffering(&self) -> FrameOutcome {
        FrameOutcome::Buffering {
            frames: self.window.len(),
            capacity: self.window.capacity(),
        }
    }

    // --- Accessors ---

    pub fn classifier(&self) -> Arc<dyn SequenceClassifier> {
        Arc::clone(&self.classifier)
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn window(&self) -> &WindowBuffer {
        &self.window
    }

    pub fn voter(&self) -> &StabilityVoter {
        &self.voter
    }

    pub fn sentence(&self) -> &SentenceBuilder {
        &self.sentence
    }

    /// Distribution from the most recent full window, for visualization.
    pub fn latest_distribution(&self) -> Option<&PredictionDistribution> {
        self.latest.as_ref()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn windows_classified(&self) -> u64 {
        self.windows_classified
    }

    // --- Lifecycle ---

    /// Reset all state for a new stream.
    pub fn reset(&mut self) {
        self.window.clear();
        self.voter.reset();
        self.sentence.clear();
        self.latest = None;
        self.frames_processed = 0;
        self.windows_classified = 0;
    }
}
