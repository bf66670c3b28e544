//! Flattens per-frame hand detections into a fixed-length keypoint vector.
//!
//! Layout: `[slot 0: 21 x (x, y, z)] [slot 1: 21 x (x, y, z)]`, 126 floats.
//! Slots are filled in detection order; a missing hand is all zeros.

use crate::landmark::{HandDetection, LandmarkPoint, HAND_LANDMARK_COUNT, MAX_HANDS};
use crate::{KeypointError, Result};

/// Floats per hand slot (21 landmarks x 3 coordinates).
pub const SLOT_LEN: usize = HAND_LANDMARK_COUNT * 3;

/// Floats per encoded frame.
pub const KEYPOINT_VECTOR_LEN: usize = MAX_HANDS * SLOT_LEN;

/// One encoded frame. Length is constant regardless of how many hands were seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointVector([f32; KEYPOINT_VECTOR_LEN]);

impl KeypointVector {
    pub const fn zeros() -> Self {
        Self([0.0; KEYPOINT_VECTOR_LEN])
    }

    pub fn from_array(values: [f32; KEYPOINT_VECTOR_LEN]) -> Self {
        Self(values)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// The 63 floats of one hand slot.
    pub fn slot(&self, slot: usize) -> &[f32] {
        &self.0[slot * SLOT_LEN..(slot + 1) * SLOT_LEN]
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for KeypointVector {
    fn default() -> Self {
        Self::zeros()
    }
}

/// Encode up to two detections.
///
/// Detections beyond [`MAX_HANDS`] are ignored; use [`encode_frame`] to reject them.
pub fn encode(detections: &[HandDetection]) -> KeypointVector {
    let mut values = [0.0f32; KEYPOINT_VECTOR_LEN];
    for (slot, hand) in detections.iter().take(MAX_HANDS).enumerate() {
        let base = slot * SLOT_LEN;
        for (i, v) in hand.flatten().enumerate() {
            values[base + i] = v;
        }
    }
    KeypointVector(values)
}

/// Encode an extractor result, failing if it reports more hands than there are slots.
pub fn encode_frame(detections: &[HandDetection]) -> Result<KeypointVector> {
    if detections.len() > MAX_HANDS {
        return Err(KeypointError::TooManyHands(detections.len()));
    }
    Ok(encode(detections))
}

/// Read one slot back into a detection. Returns `None` for an empty (all-zero) slot
/// or an out-of-range slot index.
///
/// Absent hands are encoded as zeros, so a detected hand whose 21 points are
/// all exactly `(0, 0, 0)` decodes as `None` too. Round trips only hold for
/// hands with at least one non-zero coordinate.
pub fn decode_slot(vector: &KeypointVector, slot: usize) -> Option<HandDetection> {
    if slot >= MAX_HANDS {
        return None;
    }
    let values = vector.slot(slot);
    if values.iter().all(|v| *v == 0.0) {
        return None;
    }

    let mut landmarks = [LandmarkPoint::default(); HAND_LANDMARK_COUNT];
    for (point, xyz) in landmarks.iter_mut().zip(values.chunks_exact(3)) {
        *point = LandmarkPoint::new(xyz[0], xyz[1], xyz[2]);
    }
    Some(HandDetection::new(landmarks))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hand(seed: f32) -> HandDetection {
        let mut landmarks = [LandmarkPoint::default(); HAND_LANDMARK_COUNT];
        for (i, p) in landmarks.iter_mut().enumerate() {
            let t = i as f32 / HAND_LANDMARK_COUNT as f32;
            *p = LandmarkPoint::new(seed + t * 0.1, 1.0 - seed - t * 0.05, -0.01 * i as f32);
        }
        HandDetection::new(landmarks)
    }

    #[test]
    fn test_no_hands_is_all_zero() {
        let v = encode(&[]);
        assert_eq!(v.as_slice().len(), KEYPOINT_VECTOR_LEN);
        assert_eq!(KEYPOINT_VECTOR_LEN, 126);
        assert!(v.is_zero());
    }

    #[test]
    fn test_one_hand_fills_first_slot() {
        let hand = make_hand(0.2);
        let v = encode(std::slice::from_ref(&hand));

        let expected: Vec<f32> = hand.flatten().collect();
        assert_eq!(v.slot(0), expected.as_slice());
        assert!(v.slot(1).iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_two_hands_keep_argument_order() {
        let first = make_hand(0.1);
        let second = make_hand(0.6);
        let v = encode(&[first.clone(), second.clone()]);

        assert_eq!(v.slot(0), first.flatten().collect::<Vec<_>>().as_slice());
        assert_eq!(v.slot(1), second.flatten().collect::<Vec<_>>().as_slice());

        let swapped = encode(&[second, first]);
        assert_ne!(v, swapped);
    }

    #[test]
    fn test_encode_frame_rejects_third_hand() {
        let hand = make_hand(0.3);
        let err = encode_frame(&[hand.clone(), hand.clone(), hand]).unwrap_err();
        assert!(matches!(err, KeypointError::TooManyHands(3)));
    }

    #[test]
    fn test_decode_round_trip() {
        let first = make_hand(0.25);
        let second = make_hand(0.55);

        let one = encode(std::slice::from_ref(&first));
        assert_eq!(decode_slot(&one, 0), Some(first.clone()));
        assert_eq!(decode_slot(&one, 1), None);

        let two = encode(&[first.clone(), second.clone()]);
        assert_eq!(decode_slot(&two, 0), Some(first));
        assert_eq!(decode_slot(&two, 1), Some(second));
        assert_eq!(decode_slot(&two, 2), None);
    }

    #[test]
    fn test_degenerate_hand_decodes_as_absent() {
        let origin = HandDetection::new([LandmarkPoint::new(0.0, 0.0, 0.0); HAND_LANDMARK_COUNT]);
        let vector = encode(&[origin]);
        assert!(vector.is_zero());
        assert_eq!(decode_slot(&vector, 0), None);
    }
}
