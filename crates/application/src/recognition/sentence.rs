//! Bounded sequence of committed gesture labels.

use std::collections::VecDeque;

use handsign_classifier::Label;

/// Ordered committed labels, oldest first.
///
/// Immediate repeats are dropped at append time, so no two adjacent entries
/// are equal. When the cap is exceeded the oldest labels are evicted.
#[derive(Debug, Clone)]
pub struct SentenceBuilder {
    labels: VecDeque<Label>,
    cap: usize,
}

impl SentenceBuilder {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            labels: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    /// Append `label` unless it repeats the last entry.
    ///
    /// Returns true if the sentence changed.
    pub fn commit(&mut self, label: Label) -> bool {
        if self.labels.back() == Some(&label) {
            return false;
        }

        tracing::debug!(label = %label, "Committing gesture");
        self.labels.push_back(label);
        while self.labels.len() > self.cap {
            if let Some(evicted) = self.labels.pop_front() {
                tracing::trace!(label = %evicted, "Evicted oldest gesture");
            }
        }
        true
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> + '_ {
        self.labels.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name().to_string()).collect()
    }

    /// Labels joined with spaces, for display.
    pub fn text(&self) -> String {
        self.names().join(" ")
    }

    pub fn last(&self) -> Option<&Label> {
        self.labels.back()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}
