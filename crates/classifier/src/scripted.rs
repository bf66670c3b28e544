//! Deterministic classifier that replays a fixed script of outputs.
//!
//! Useful for exercising the recognition pipeline without a model file.

use std::sync::atomic::{AtomicUsize, Ordering};

use handsign_keypoints::KeypointVector;

use crate::{ClassifierError, Result, SequenceClassifier};

/// Returns the scripted outputs in order, cycling once the script is exhausted.
#[derive(Debug)]
pub struct ScriptedClassifier {
    script: Vec<Vec<f32>>,
    expected_window: Option<usize>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    /// Always return the same distribution.
    pub fn constant(probabilities: Vec<f32>) -> Self {
        Self::cycle(vec![probabilities])
    }

    /// Return each entry in turn, wrapping around at the end.
    pub fn cycle(script: Vec<Vec<f32>>) -> Self {
        Self {
            script,
            expected_window: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reject windows whose length differs from `len`.
    pub fn with_window_len(mut self, len: usize) -> Self {
        self.expected_window = Some(len);
        self
    }

    /// Number of times `classify` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SequenceClassifier for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn label_count(&self) -> Option<usize> {
        self.script.first().map(Vec::len)
    }

    fn classify(&self, window: &[KeypointVector]) -> Result<Vec<f32>> {
        if let Some(expected) = self.expected_window {
            if window.len() != expected {
                return Err(ClassifierError::InvalidInput(format!(
                    "window has {} frames, expected {expected}",
                    window.len()
                )));
            }
        }
        if self.script.is_empty() {
            return Err(ClassifierError::ModelNotLoaded);
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script[call % self.script.len()].clone())
    }
}
