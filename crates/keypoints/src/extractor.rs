use crate::landmark::HandDetection;

/// Adapter over a hand-landmark model.
///
/// Implementations return zero, one or two detections per frame, in whatever
/// order the model reports them. No hand visible is a valid empty result.
pub trait KeypointExtractor: Send {
    type Frame;

    fn name(&self) -> &'static str;

    fn extract(&mut self, frame: &Self::Frame) -> crate::Result<Vec<HandDetection>>;
}
