//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use handsign_application::{RecognitionSettings, VoteStrategy};

/// Handsign - recognize hand gestures from recorded landmarks
#[derive(Parser, Debug)]
#[command(name = "handsign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON Lines landmark recording through a model
    Run {
        /// ONNX sequence model
        #[arg(short, long)]
        model: PathBuf,

        /// Landmark frames, one JSON object per line
        #[arg(short, long)]
        frames: PathBuf,
    },

    /// Print the effective settings
    Config {
        /// Save them to the settings file
        #[arg(long)]
        write: bool,
    },
}

/// Flags that take precedence over the settings file.
#[derive(Args, Debug, Default)]
pub struct SettingsOverrides {
    /// Comma-separated labels in model output order
    #[arg(long, global = true, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// How recent predictions are reduced before a commit
    #[arg(long, global = true, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Minimum probability a commit must exceed
    #[arg(long, global = true)]
    pub threshold: Option<f32>,

    /// Frames per classification window
    #[arg(long, global = true)]
    pub window_size: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    LowestRecent,
    Majority,
}

impl From<StrategyArg> for VoteStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::LowestRecent => VoteStrategy::LowestRecent,
            StrategyArg::Majority => VoteStrategy::Majority,
        }
    }
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut RecognitionSettings) {
        if let Some(labels) = &self.labels {
            settings.labels = labels.clone();
        }
        if let Some(strategy) = self.strategy {
            settings.vote_strategy = strategy.into();
        }
        if let Some(threshold) = self.threshold {
            settings.confidence_threshold = threshold;
        }
        if let Some(window_size) = self.window_size {
            settings.window_size = window_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "handsign",
            "run",
            "--model",
            "model.onnx",
            "--frames",
            "frames.jsonl",
            "--labels",
            "hello,thanks",
            "--strategy",
            "majority",
            "--threshold",
            "0.7",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Run { .. }));
        let mut settings = RecognitionSettings::default();
        cli.overrides.apply(&mut settings);
        assert_eq!(settings.labels, vec!["hello", "thanks"]);
        assert_eq!(settings.vote_strategy, VoteStrategy::Majority);
        assert_eq!(settings.confidence_threshold, 0.7);
        assert_eq!(settings.window_size, 30);
    }

    #[test]
    fn test_parse_config_write() {
        let cli = Cli::try_parse_from(["handsign", "config", "--write"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { write: true }));
    }

    #[test]
    fn test_run_requires_model() {
        assert!(Cli::try_parse_from(["handsign", "run", "--frames", "f.jsonl"]).is_err());
    }
}
