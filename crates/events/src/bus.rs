//! Event sinks for recognition events.
//!
//! The listener publishes typed events through [`publish`]; a sink only sees
//! the [`Topic`] and the serialized payload, so it can forward them to a UI, a
//! terminal or a test capture without depending on the event structs.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Topics published by a recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "recognition:started")]
    SessionStarted,
    #[serde(rename = "recognition:stopped")]
    SessionStopped,
    #[serde(rename = "recognition:prediction")]
    Prediction,
    #[serde(rename = "recognition:commit")]
    Commit,
    #[serde(rename = "recognition:sentence")]
    Sentence,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "recognition:started",
            Self::SessionStopped => "recognition:stopped",
            Self::Prediction => "recognition:prediction",
            Self::Commit => "recognition:commit",
            Self::Sentence => "recognition:sentence",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload that belongs to one topic and one session.
pub trait RecognitionEvent: Serialize {
    const TOPIC: Topic;

    fn session_id(&self) -> &str;
}

/// Receives published events.
///
/// `emit` is called from the frame loop and must not block.
pub trait EventBus: Send + Sync {
    fn emit(&self, topic: Topic, session_id: &str, payload: serde_json::Value);
}

pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and hand it to `bus` under its topic.
pub fn publish<E: RecognitionEvent>(bus: &dyn EventBus, event: &E) {
    match serde_json::to_value(event) {
        Ok(value) => bus.emit(E::TOPIC, event.session_id(), value),
        Err(e) => tracing::warn!(topic = %E::TOPIC, error = %e, "Failed to serialize event"),
    }
}

/// One event captured by [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub topic: Topic,
    pub session_id: String,
    pub payload: serde_json::Value,
}

/// Keeps every event in publish order, for tests and replay tooling.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<RecordedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_events<T>(&self, f: impl FnOnce(&mut Vec<RecordedEvent>) -> T) -> T {
        let mut guard = self.events.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.with_events(|events| events.clone())
    }

    pub fn events_for(&self, topic: Topic) -> Vec<RecordedEvent> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.topic == topic)
                .cloned()
                .collect()
        })
    }

    /// Events from one session, in publish order.
    pub fn session(&self, session_id: &str) -> Vec<RecordedEvent> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.session_id == session_id)
                .cloned()
                .collect()
        })
    }

    /// Topic sequence, handy for asserting publish order.
    pub fn topics(&self) -> Vec<Topic> {
        self.with_events(|events| events.iter().map(|e| e.topic).collect())
    }

    pub fn len(&self) -> usize {
        self.with_events(|events| events.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.with_events(|events| events.clear());
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: Topic, session_id: &str, payload: serde_json::Value) {
        self.with_events(|events| {
            events.push(RecordedEvent {
                topic,
                session_id: session_id.to_string(),
                payload,
            })
        });
    }
}
