//! Terminal output.

use handsign_classifier::PredictionDistribution;
use handsign_events::{EventBus, Topic};

const BAR_WIDTH: usize = 30;

/// One bar per label, scaled to the label's probability.
pub fn probability_bars(dist: &PredictionDistribution) -> String {
    let name_width = dist.labels().names().map(str::len).max().unwrap_or(0);

    dist.to_pairs()
        .into_iter()
        .map(|(name, probability)| {
            let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
            format!(
                "{name:>name_width$} |{}{}| {probability:.2}",
                "#".repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints commits and sentence changes as they happen.
pub struct ConsoleEventBus;

impl EventBus for ConsoleEventBus {
    fn emit(&self, topic: Topic, session_id: &str, payload: serde_json::Value) {
        match topic {
            Topic::Commit => {
                let label = payload["label"].as_str().unwrap_or("?");
                let probability = payload["probability"].as_f64().unwrap_or(0.0);
                println!("commit  {label} ({probability:.2}) at frame {}", payload["seq"]);
            }
            Topic::Sentence => {
                let words: Vec<&str> = payload["labels"]
                    .as_array()
                    .map(|labels| labels.iter().filter_map(|l| l.as_str()).collect())
                    .unwrap_or_default();
                println!("sentence  {}", words.join(" "));
            }
            _ => tracing::trace!(%topic, session_id, "event"),
        }
    }
}
