use serde::{Deserialize, Serialize};

use crate::{KeypointError, Result};

/// Number of landmarks the hand model produces per detected hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Number of hand slots in a frame.
pub const MAX_HANDS: usize = 2;

/// One tracked point on a hand.
///
/// `x` and `y` are normalized to the image (0..1); `z` is depth relative to the wrist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for LandmarkPoint {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A single detected hand: exactly 21 landmarks in model order.
///
/// Detections carry no identity. The first detection of one frame is not
/// guaranteed to be the same physical hand as the first detection of the next.
#[derive(Debug, Clone, PartialEq)]
pub struct HandDetection {
    landmarks: [LandmarkPoint; HAND_LANDMARK_COUNT],
}

impl HandDetection {
    pub fn new(landmarks: [LandmarkPoint; HAND_LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[LandmarkPoint; HAND_LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> LandmarkPoint {
        self.landmarks[0]
    }

    /// Landmark coordinates flattened as `x, y, z` per point.
    pub fn flatten(&self) -> impl Iterator<Item = f32> + '_ {
        self.landmarks.iter().flat_map(|p| [p.x, p.y, p.z])
    }
}

impl TryFrom<Vec<LandmarkPoint>> for HandDetection {
    type Error = KeypointError;

    fn try_from(points: Vec<LandmarkPoint>) -> Result<Self> {
        let len = points.len();
        let landmarks: [LandmarkPoint; HAND_LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| KeypointError::LandmarkCount(len))?;
        Ok(Self { landmarks })
    }
}

impl TryFrom<&[[f32; 3]]> for HandDetection {
    type Error = KeypointError;

    fn try_from(points: &[[f32; 3]]) -> Result<Self> {
        points
            .iter()
            .copied()
            .map(LandmarkPoint::from)
            .collect::<Vec<_>>()
            .try_into()
    }
}
