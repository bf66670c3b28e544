//! Recognition settings with JSON persistence.

use std::path::{Path, PathBuf};

use handsign_classifier::LabelSet;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::recognition::VoteStrategy;
use crate::{RecognitionError, Result};

/// Tunables for one recognition session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Frames per classification window (N).
    pub window_size: usize,
    /// Predictions kept for the stability vote (M).
    pub history_size: usize,
    /// Maximum committed labels kept (L).
    pub sentence_cap: usize,
    /// Exclusive lower bound on the argmax probability for a commit.
    pub confidence_threshold: f32,
    /// Label order matching the classifier's outputs.
    pub labels: Vec<String>,
    pub vote_strategy: VoteStrategy,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            history_size: DEFAULT_HISTORY_SIZE,
            sentence_cap: DEFAULT_SENTENCE_CAP,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            vote_strategy: VoteStrategy::default(),
        }
    }
}

impl RecognitionSettings {
    /// Check values and build the label set they describe.
    pub fn validate(&self) -> Result<LabelSet> {
        if self.window_size == 0 {
            return Err(RecognitionError::Configuration(
                "window_size must be > 0".to_string(),
            ));
        }
        if self.history_size == 0 {
            return Err(RecognitionError::Configuration(
                "history_size must be > 0".to_string(),
            ));
        }
        if self.sentence_cap == 0 {
            return Err(RecognitionError::Configuration(
                "sentence_cap must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RecognitionError::Configuration(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(LabelSet::new(&self.labels)?)
    }

    /// Load settings from a JSON file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading recognition settings");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write settings as pretty JSON, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("handsign").join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }
}
