//! End-to-end recognition scenarios driven by a scripted classifier.

use std::sync::Arc;

use handsign_application::{
    FrameOutcome, RecognitionError, RecognitionSession, RecognitionSettings, VoteStrategy,
};
use handsign_classifier::ScriptedClassifier;
use handsign_keypoints::{
    HandDetection, KeypointError, KeypointExtractor, LandmarkPoint, HAND_LANDMARK_COUNT,
};

fn fixed_hand() -> HandDetection {
    let mut landmarks = [LandmarkPoint::default(); HAND_LANDMARK_COUNT];
    for (i, p) in landmarks.iter_mut().enumerate() {
        *p = LandmarkPoint::new(0.3 + i as f32 * 0.01, 0.7 - i as f32 * 0.01, -0.001 * i as f32);
    }
    HandDetection::new(landmarks)
}

fn settings(labels: &[&str], strategy: VoteStrategy) -> RecognitionSettings {
    RecognitionSettings {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        vote_strategy: strategy,
        ..Default::default()
    }
}

/// Push frames until `windows` full windows have been classified.
fn run_windows(session: &mut RecognitionSession, windows: usize) -> Vec<FrameOutcome> {
    let hand = fixed_hand();
    let mut outcomes = Vec::new();
    let mut classified = 0;
    while classified < windows {
        let outcome = session
            .process_frame(std::slice::from_ref(&hand))
            .expect("frame should process");
        if outcome.prediction().is_some() {
            classified += 1;
        }
        outcomes.push(outcome);
    }
    outcomes
}

// =============================================================================
// Steady prediction
// =============================================================================

mod steady {
    use super::*;

    #[test]
    fn test_constant_prediction_commits_once() {
        let classifier = Arc::new(ScriptedClassifier::constant(vec![0.8, 0.1, 0.1]).with_window_len(30));
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::LowestRecent), classifier.clone())
                .unwrap();

        let outcomes = run_windows(&mut session, 1);
        assert_eq!(outcomes.len(), 30, "first window needs 30 frames");
        assert_eq!(session.sentence().names(), vec!["A"]);

        let outcomes = run_windows(&mut session, 10);
        assert_eq!(outcomes.len(), 10, "each further frame yields a window");
        assert_eq!(session.sentence().names(), vec!["A"]);
        assert_eq!(classifier.calls(), 11);
        assert!(outcomes
            .iter()
            .all(|o| o.prediction().map(|p| !p.sentence_changed).unwrap_or(false)));
    }

    #[test]
    fn test_constant_prediction_with_majority_strategy() {
        let classifier = Arc::new(ScriptedClassifier::constant(vec![0.8, 0.1, 0.1]));
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::Majority), classifier).unwrap();

        run_windows(&mut session, 11);
        assert_eq!(session.sentence().names(), vec!["A"]);
    }

    #[test]
    fn test_below_threshold_never_commits() {
        let classifier = Arc::new(ScriptedClassifier::constant(vec![0.4, 0.3, 0.3]));
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::LowestRecent), classifier).unwrap();

        run_windows(&mut session, 20);
        assert!(session.sentence().is_empty());
        assert_eq!(session.voter().history().len(), 10);
    }
}

// =============================================================================
// Oscillating prediction
// =============================================================================

mod oscillating {
    use super::*;

    fn alternating() -> Arc<ScriptedClassifier> {
        Arc::new(ScriptedClassifier::cycle(vec![
            vec![0.9, 0.05, 0.05],
            vec![0.05, 0.9, 0.05],
        ]))
    }

    #[test]
    fn test_literal_strategy_stays_bounded() {
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::LowestRecent), alternating())
                .unwrap();

        for _ in 0..50 {
            run_windows(&mut session, 1);
            assert!(session.sentence().len() <= 5);
        }
        // "A" stays in the history, so "B" never agrees with it.
        assert_eq!(session.sentence().names(), vec!["A"]);
    }

    #[test]
    fn test_majority_strategy_stays_bounded() {
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::Majority), alternating())
                .unwrap();

        for _ in 0..50 {
            run_windows(&mut session, 1);
            assert!(session.sentence().len() <= 5);
        }
        // Even splits tie to "A".
        assert_eq!(session.sentence().names(), vec!["A"]);
    }
}

// =============================================================================
// Label runs and the sentence cap
// =============================================================================

mod runs {
    use super::*;

    fn one_hot(index: usize, len: usize) -> Vec<f32> {
        let mut v = vec![0.02; len];
        v[index] = 1.0 - 0.02 * (len - 1) as f32;
        v
    }

    #[test]
    fn test_sentence_keeps_most_recent_runs() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let mut script = Vec::new();
        for i in 0..names.len() {
            // Long enough runs for the majority to flip each time.
            for _ in 0..11 {
                script.push(one_hot(i, names.len()));
            }
        }
        let classifier = Arc::new(ScriptedClassifier::cycle(script));
        let mut session =
            RecognitionSession::new(settings(&names, VoteStrategy::Majority), classifier).unwrap();

        run_windows(&mut session, 66);

        assert_eq!(session.sentence().names(), vec!["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_literal_strategy_follows_descending_runs() {
        let names = ["a", "b", "c"];
        let mut script = Vec::new();
        for i in (0..names.len()).rev() {
            for _ in 0..3 {
                script.push(one_hot(i, names.len()));
            }
        }
        let classifier = Arc::new(ScriptedClassifier::cycle(script));
        let mut session =
            RecognitionSession::new(settings(&names, VoteStrategy::LowestRecent), classifier).unwrap();

        run_windows(&mut session, 9);

        assert_eq!(session.sentence().names(), vec!["c", "b", "a"]);
    }
}

// =============================================================================
// Adapter contract
// =============================================================================

mod contract {
    use super::*;

    /// Replays pre-recorded landmark lists as if they came from a model.
    struct ReplayExtractor;

    impl KeypointExtractor for ReplayExtractor {
        type Frame = Vec<Vec<[f32; 3]>>;

        fn name(&self) -> &'static str {
            "replay"
        }

        fn extract(&mut self, frame: &Self::Frame) -> Result<Vec<HandDetection>, KeypointError> {
            frame
                .iter()
                .map(|points| HandDetection::try_from(points.as_slice()))
                .collect()
        }
    }

    #[test]
    fn test_short_hand_is_rejected_without_buffering() {
        let classifier = Arc::new(ScriptedClassifier::constant(vec![0.8, 0.1, 0.1]));
        let mut session =
            RecognitionSession::new(settings(&["A", "B", "C"], VoteStrategy::LowestRecent), classifier).unwrap();
        let mut extractor = ReplayExtractor;

        let bad_frame = vec![vec![[0.5, 0.5, 0.0]; 20]];
        let err = session.process_with(&mut extractor, &bad_frame).unwrap_err();
        assert!(matches!(err, RecognitionError::AdapterContract(_)));
        assert!(session.window().is_empty());

        let good_frame = vec![vec![[0.5, 0.5, 0.0]; 21]];
        session.process_with(&mut extractor, &good_frame).unwrap();
        assert_eq!(session.window().len(), 1);

        let empty_frame: Vec<Vec<[f32; 3]>> = Vec::new();
        session.process_with(&mut extractor, &empty_frame).unwrap();
        assert_eq!(session.window().len(), 2);
    }

    #[test]
    fn test_wrong_output_length_is_configuration_error() {
        // Declares nothing about its label count up front, then returns four outputs.
        struct Undeclared;
        impl handsign_classifier::SequenceClassifier for Undeclared {
            fn name(&self) -> &'static str {
                "undeclared"
            }
            fn classify(
                &self,
                _window: &[handsign_keypoints::KeypointVector],
            ) -> handsign_classifier::Result<Vec<f32>> {
                Ok(vec![0.25; 4])
            }
        }

        let mut session = RecognitionSession::new(
            RecognitionSettings {
                window_size: 1,
                ..settings(&["A", "B", "C"], VoteStrategy::LowestRecent)
            },
            Arc::new(Undeclared),
        )
        .unwrap();

        let err = session.process_frame(&[]).unwrap_err();
        assert!(err.is_fatal());
        assert!(session.voter().history().is_empty());
        assert!(session.latest_distribution().is_none());
    }
}
