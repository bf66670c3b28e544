//! Stability vote over recent window predictions.
//!
//! Each full window yields one distribution. The voter records its argmax in a
//! bounded history and only lets a label through when the history agrees with
//! it and the classifier is confident enough.

use std::collections::VecDeque;

use handsign_classifier::{Label, PredictionDistribution};
use serde::{Deserialize, Serialize};

/// How the history picks the label a new prediction must agree with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStrategy {
    /// The lowest label index present in the recent history.
    ///
    /// Equivalent to comparing the argmax against the first of the sorted
    /// distinct recent predictions. It is a narrow consistency check rather
    /// than a vote: once a low-index
    /// label enters the history, higher-index labels cannot commit until it
    /// has been evicted.
    #[default]
    LowestRecent,
    /// The most frequent label in the recent history, ties to the lowest index.
    Majority,
}

impl VoteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowestRecent => "lowest_recent",
            Self::Majority => "majority",
        }
    }
}

/// Bounded FIFO of argmax label indices, oldest first.
#[derive(Debug, Clone)]
pub struct PredictionHistory {
    entries: VecDeque<usize>,
    capacity: usize,
}

impl PredictionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, label_index: usize) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(label_index);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    /// Lowest label index present.
    pub fn lowest(&self) -> Option<usize> {
        self.entries.iter().copied().min()
    }

    /// Most frequent label index; ties go to the lowest index.
    pub fn majority(&self) -> Option<usize> {
        let max_index = self.entries.iter().copied().max()?;
        let mut counts = vec![0usize; max_index + 1];
        for &i in &self.entries {
            counts[i] += 1;
        }

        let mut best = 0;
        for (i, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = i;
            }
        }
        Some(best)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Decides when a window prediction is stable enough to commit.
#[derive(Debug, Clone)]
pub struct StabilityVoter {
    history: PredictionHistory,
    strategy: VoteStrategy,
    threshold: f32,
    last_committed: Option<Label>,
}

impl StabilityVoter {
    pub fn new(history_size: usize, threshold: f32, strategy: VoteStrategy) -> Self {
        Self {
            history: PredictionHistory::new(history_size),
            strategy,
            threshold,
            last_committed: None,
        }
    }

    /// Record one window's distribution and return the label to commit, if any.
    pub fn observe(&mut self, dist: &PredictionDistribution) -> Option<Label> {
        let argmax = dist.argmax();
        let probability = dist.probability(argmax.index()).unwrap_or(0.0);

        self.history.push(argmax.index());

        let reference = self.reference_index()?;
        if reference != argmax.index() {
            tracing::trace!(
                label = %argmax,
                reference,
                strategy = self.strategy.as_str(),
                "Prediction disagrees with history"
            );
            return None;
        }

        if probability <= self.threshold {
            tracing::trace!(label = %argmax, probability, "Prediction below threshold");
            return None;
        }

        self.last_committed = Some(argmax.clone());
        Some(argmax)
    }

    /// Label index the next prediction must match under the current strategy.
    pub fn reference_index(&self) -> Option<usize> {
        match self.strategy {
            VoteStrategy::LowestRecent => self.history.lowest(),
            VoteStrategy::Majority => self.history.majority(),
        }
    }

    pub fn history(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn strategy(&self) -> VoteStrategy {
        self.strategy
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn last_committed(&self) -> Option<&Label> {
        self.last_committed.as_ref()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_committed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsign_classifier::LabelSet;

    fn labels() -> LabelSet {
        LabelSet::new(["hello", "thanks", "iloveyou"]).unwrap()
    }

    fn dist(probabilities: [f32; 3]) -> PredictionDistribution {
        PredictionDistribution::new(labels(), probabilities.to_vec()).unwrap()
    }

    fn names(commits: &[Option<Label>]) -> Vec<Option<String>> {
        commits
            .iter()
            .map(|c| c.as_ref().map(|l| l.name().to_string()))
            .collect()
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = PredictionHistory::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_history_majority_tie_goes_to_lowest() {
        let mut history = PredictionHistory::new(4);
        for i in [2, 1, 2, 1] {
            history.push(i);
        }
        assert_eq!(history.majority(), Some(1));
        assert_eq!(history.lowest(), Some(1));
    }

    #[test]
    fn test_lowest_recent_commits_confident_first_prediction() {
        let mut voter = StabilityVoter::new(10, 0.5, VoteStrategy::LowestRecent);
        let committed = voter.observe(&dist([0.9, 0.05, 0.05]));
        assert_eq!(committed.map(|l| l.name().to_string()), Some("hello".into()));
        assert_eq!(voter.last_committed().map(Label::name), Some("hello"));
    }

    #[test]
    fn test_majority_commits_confident_first_prediction() {
        let mut voter = StabilityVoter::new(10, 0.5, VoteStrategy::Majority);
        let committed = voter.observe(&dist([0.9, 0.05, 0.05]));
        assert_eq!(committed.map(|l| l.name().to_string()), Some("hello".into()));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut voter = StabilityVoter::new(10, 0.5, VoteStrategy::LowestRecent);
        assert!(voter.observe(&dist([0.5, 0.25, 0.25])).is_none());
        assert_eq!(voter.history().len(), 1);
    }

    #[test]
    fn test_low_confidence_still_enters_history() {
        let mut voter = StabilityVoter::new(10, 0.5, VoteStrategy::LowestRecent);
        voter.observe(&dist([0.4, 0.3, 0.3]));
        // "hello" sits in history now, so a confident "thanks" disagrees.
        assert!(voter.observe(&dist([0.05, 0.9, 0.05])).is_none());
    }

    #[test]
    fn test_strategies_diverge_on_minority_low_index() {
        // Four "thanks" then one "hello": hello is the lowest index present
        // but not the most frequent.
        let mut literal = StabilityVoter::new(10, 0.5, VoteStrategy::LowestRecent);
        let mut majority = StabilityVoter::new(10, 0.5, VoteStrategy::Majority);

        let thanks = dist([0.05, 0.9, 0.05]);
        let hello = dist([0.9, 0.05, 0.05]);

        let mut literal_commits = Vec::new();
        let mut majority_commits = Vec::new();
        for d in [&thanks, &thanks, &thanks, &thanks, &hello] {
            literal_commits.push(literal.observe(d));
            majority_commits.push(majority.observe(d));
        }

        let thanks_s = Some("thanks".to_string());
        assert_eq!(
            names(&literal_commits),
            vec![thanks_s.clone(), thanks_s.clone(), thanks_s.clone(), thanks_s.clone(), Some("hello".into())]
        );
        assert_eq!(
            names(&majority_commits),
            vec![thanks_s.clone(), thanks_s.clone(), thanks_s.clone(), thanks_s, None]
        );
    }

    #[test]
    fn test_lowest_recent_blocks_higher_label_until_evicted() {
        let mut literal = StabilityVoter::new(3, 0.5, VoteStrategy::LowestRecent);
        let mut majority = StabilityVoter::new(3, 0.5, VoteStrategy::Majority);

        let hello = dist([0.9, 0.05, 0.05]);
        let thanks = dist([0.05, 0.9, 0.05]);

        assert!(literal.observe(&hello).is_some());
        assert!(majority.observe(&hello).is_some());

        // history: [hello, thanks] -> literal blocks, majority tie goes to hello.
        assert!(literal.observe(&thanks).is_none());
        assert!(majority.observe(&thanks).is_none());

        // history: [hello, thanks, thanks] -> majority agrees, literal still blocks.
        assert!(literal.observe(&thanks).is_none());
        assert!(majority.observe(&thanks).is_some());

        // history: [thanks, thanks, thanks] -> hello evicted, both agree.
        assert!(literal.observe(&thanks).is_some());
        assert!(majority.observe(&thanks).is_some());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut voter = StabilityVoter::new(10, 0.5, VoteStrategy::LowestRecent);
        voter.observe(&dist([0.9, 0.05, 0.05]));
        voter.reset();
        assert!(voter.history().is_empty());
        assert!(voter.last_committed().is_none());
    }
}
