//! JSON Lines landmark recordings.
//!
//! Each non-empty line is one frame: `{"hands": [[[x, y, z], ...], ...]}`.
//! An empty `hands` array is a frame in which no hand was seen.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use handsign_keypoints::{HandDetection, KeypointError, KeypointExtractor};
use serde::Deserialize;

/// One raw line of a recording.
#[derive(Debug, Clone)]
pub struct RecordedLine {
    /// 1-based line number in the file.
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    hands: Vec<Vec<[f32; 3]>>,
}

/// Decodes recorded lines into detections, checking landmark counts.
///
/// A line that is not a frame object is an extraction failure, so a damaged
/// recording skips frames the same way a misbehaving model would.
pub struct RecordedExtractor;

impl KeypointExtractor for RecordedExtractor {
    type Frame = RecordedLine;

    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn extract(&mut self, line: &RecordedLine) -> handsign_keypoints::Result<Vec<HandDetection>> {
        let record: FrameRecord = serde_json::from_str(&line.text).map_err(|e| {
            KeypointError::Extraction(format!("line {}: {e}", line.number))
        })?;
        record
            .hands
            .iter()
            .map(|points| HandDetection::try_from(points.as_slice()))
            .collect()
    }
}

pub fn read_lines(path: &Path) -> anyhow::Result<Vec<RecordedLine>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open frames file {}", path.display()))?;
    collect_lines(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to read frames from {}", path.display()))
}

fn collect_lines(reader: impl BufRead) -> std::io::Result<Vec<RecordedLine>> {
    let mut lines = Vec::new();
    for (index, text) in reader.lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        lines.push(RecordedLine {
            number: index + 1,
            text,
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn hand_json(points: usize) -> String {
        let point = "[0.5,0.5,0.0]";
        format!("[{}]", vec![point; points].join(","))
    }

    fn line(number: usize, text: impl Into<String>) -> RecordedLine {
        RecordedLine {
            number,
            text: text.into(),
        }
    }

    #[test]
    fn test_blank_lines_are_skipped_but_numbered() {
        let input = format!("{{\"hands\": [{}]}}\n\n{{}}\n", hand_json(21));
        let lines = collect_lines(Cursor::new(input)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_missing_hands_is_an_empty_frame() {
        let hands = RecordedExtractor.extract(&line(1, "{}")).unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_malformed_line_is_extraction_error() {
        let err = RecordedExtractor
            .extract(&line(2, "not json"))
            .unwrap_err();
        match err {
            KeypointError::Extraction(message) => assert!(message.starts_with("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_hand_is_rejected() {
        let text = format!("{{\"hands\": [{}]}}", hand_json(20));
        let err = RecordedExtractor.extract(&line(1, text)).unwrap_err();
        assert!(matches!(err, KeypointError::LandmarkCount(20)));
    }

    #[test]
    fn test_hand_order_is_kept() {
        let text = format!(
            "{{\"hands\": [{}, [{}]]}}",
            hand_json(21),
            vec!["[0.7,0.8,0.9]"; 21].join(",")
        );
        let hands = RecordedExtractor.extract(&line(1, text)).unwrap();
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[1].wrist().x, 0.7);
    }
}
