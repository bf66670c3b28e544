/// Frames per classification window.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Argmax predictions kept for the stability vote.
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Maximum labels kept in the output sentence.
pub const DEFAULT_SENTENCE_CAP: usize = 5;

/// Minimum (exclusive) probability for a prediction to be committed.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Label order the bundled action model was trained with.
pub const DEFAULT_LABELS: [&str; 3] = ["hello", "thanks", "iloveyou"];
