//! Event contracts emitted by the recognition pipeline.
//!
//! Presentation layers subscribe to these instead of reading session state
//! directly. Using shared types keeps producers and consumers agreeing on
//! field names.

mod bus;

pub use bus::{
    publish, EventBus, EventBusRef, InMemoryEventBus, RecognitionEvent, RecordedEvent, Topic,
};

use serde::{Deserialize, Serialize};

/// Current time in milliseconds since epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Emitted when a listener starts consuming frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartedEvent {
    pub session_id: String,
    pub classifier: String,
    pub window_size: usize,
    pub labels: Vec<String>,
    pub ts_ms: i64,
}

impl SessionStartedEvent {
    pub fn new(classifier: &str, window_size: usize, labels: Vec<String>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            classifier: classifier.to_string(),
            window_size,
            labels,
            ts_ms: now_ms(),
        }
    }
}

/// Emitted when a listener stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStoppedEvent {
    pub session_id: String,
    pub frames_processed: u64,
    /// Set when the listener stopped because of a fatal error.
    #[serde(default)]
    pub error: Option<String>,
    pub ts_ms: i64,
}

/// One label's probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelProbability {
    pub label: String,
    pub probability: f32,
}

/// Emitted for every classified window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub session_id: String,
    /// Sequence number of the frame that completed the window.
    pub seq: u64,
    pub label: String,
    pub probability: f32,
    pub probabilities: Vec<LabelProbability>,
    pub ts_ms: i64,
}

/// Emitted when a label passes the stability vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureCommitEvent {
    pub session_id: String,
    pub seq: u64,
    pub label: String,
    pub probability: f32,
    pub ts_ms: i64,
}

/// Emitted when the sentence changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceEvent {
    pub session_id: String,
    pub labels: Vec<String>,
    pub ts_ms: i64,
}

impl RecognitionEvent for SessionStartedEvent {
    const TOPIC: Topic = Topic::SessionStarted;

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl RecognitionEvent for SessionStoppedEvent {
    const TOPIC: Topic = Topic::SessionStopped;

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl RecognitionEvent for PredictionEvent {
    const TOPIC: Topic = Topic::Prediction;

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl RecognitionEvent for GestureCommitEvent {
    const TOPIC: Topic = Topic::Commit;

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl RecognitionEvent for SentenceEvent {
    const TOPIC: Topic = Topic::Sentence;

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
