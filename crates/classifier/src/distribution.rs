use crate::labels::{Label, LabelSet};
use crate::{ClassifierError, Result};

/// Slack allowed on the [0, 1] bound for float noise from softmax outputs.
const PROBABILITY_EPSILON: f32 = 1e-4;

/// One probability per label of a fixed label set.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionDistribution {
    labels: LabelSet,
    probabilities: Vec<f32>,
}

impl PredictionDistribution {
    /// Wrap raw classifier output, checking it covers exactly `labels`.
    pub fn new(labels: LabelSet, probabilities: Vec<f32>) -> Result<Self> {
        if probabilities.len() != labels.len() {
            return Err(ClassifierError::LabelCountMismatch {
                expected: labels.len(),
                actual: probabilities.len(),
            });
        }

        for (label, &value) in labels.names().zip(&probabilities) {
            let in_range = (-PROBABILITY_EPSILON..=1.0 + PROBABILITY_EPSILON).contains(&value);
            if !value.is_finite() || !in_range {
                return Err(ClassifierError::InvalidProbability {
                    label: label.to_string(),
                    value,
                });
            }
        }

        Ok(Self {
            labels,
            probabilities,
        })
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    pub fn probability(&self, index: usize) -> Option<f32> {
        self.probabilities.get(index).copied()
    }

    pub fn probability_of(&self, name: &str) -> Option<f32> {
        self.labels
            .index_of(name)
            .and_then(|i| self.probability(i))
    }

    /// Most probable label. Ties resolve to the lowest label index.
    pub fn argmax(&self) -> Label {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        self.labels.at(best)
    }

    /// `(label name, probability)` pairs in label order.
    pub fn to_pairs(&self) -> Vec<(String, f32)> {
        self.labels
            .names()
            .map(str::to_string)
            .zip(self.probabilities.iter().copied())
            .collect()
    }
}
