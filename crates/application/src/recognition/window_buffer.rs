//! Sliding window of encoded frames for sequence classification.
//!
//! Ring storage with a write cursor: pushes are O(1) and never move memory.
//! Once the window holds `capacity` frames each push overwrites the oldest.

use handsign_keypoints::{KeypointVector, KEYPOINT_VECTOR_LEN};

/// Keeps the most recent `capacity` keypoint vectors in arrival order.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    /// Ring storage, grows up to `capacity` during warm-up.
    frames: Vec<KeypointVector>,
    /// Slot the next push writes to once the ring is full.
    write_index: usize,
    capacity: usize,
}

impl WindowBuffer {
    /// Create an empty window. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Vec::with_capacity(capacity),
            write_index: 0,
            capacity,
        }
    }

    /// Append a frame, evicting the oldest when the window is full.
    pub fn push(&mut self, frame: KeypointVector) {
        if self.frames.len() < self.capacity {
            self.frames.push(frame);
        } else {
            self.frames[self.write_index] = frame;
        }
        self.write_index = (self.write_index + 1) % self.capacity;
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the oldest frame in `frames`.
    fn oldest(&self) -> usize {
        if self.is_full() {
            self.write_index
        } else {
            0
        }
    }

    /// Frames oldest-first, without copying.
    pub fn iter(&self) -> impl Iterator<Item = &KeypointVector> + '_ {
        let start = self.oldest();
        self.frames[start..].iter().chain(self.frames[..start].iter())
    }

    /// Owned copy of the window, oldest-first.
    ///
    /// The copy is independent of later pushes, so it can be handed to a worker.
    pub fn snapshot(&self) -> Vec<KeypointVector> {
        self.iter().copied().collect()
    }

    /// Row-major `[len x 126]` floats, oldest frame first.
    pub fn as_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.frames.len() * KEYPOINT_VECTOR_LEN);
        for frame in self.iter() {
            flat.extend_from_slice(frame.as_slice());
        }
        flat
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.write_index = 0;
    }
}
