//! Bounded bus carrying per-frame hand detections from capture to recognition.
//!
//! Frames carry a monotonic sequence number so the receiving side can detect
//! gaps left by dropped frames.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use handsign_keypoints::HandDetection;
use tokio::sync::mpsc;

/// Wall-clock milliseconds since epoch. Producers stamp frames with this.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Default channel capacity in frames (about one second at 30 fps).
pub const DEFAULT_CAPACITY_FRAMES: usize = 32;

/// Minimum channel capacity in frames.
const MIN_CAPACITY_FRAMES: usize = 4;

/// One captured frame's detections with ordering metadata.
#[derive(Debug, Clone)]
pub struct LandmarkFrame {
    /// Monotonic sequence number for ordering.
    pub seq: u64,
    /// Capture timestamp in milliseconds (wall clock).
    pub ts_ms: i64,
    /// Zero, one or two hands, in extractor order. Shared to avoid copies.
    pub detections: Arc<[HandDetection]>,
}

impl LandmarkFrame {
    pub fn new(seq: u64, ts_ms: i64, detections: impl Into<Arc<[HandDetection]>>) -> Self {
        Self {
            seq,
            ts_ms,
            detections: detections.into(),
        }
    }

    pub fn hand_count(&self) -> usize {
        self.detections.len()
    }
}

/// Configuration for the frame bus.
#[derive(Debug, Clone)]
pub struct FrameBusConfig {
    /// Channel capacity in frames.
    pub capacity_frames: usize,
}

impl Default for FrameBusConfig {
    fn default() -> Self {
        Self {
            capacity_frames: DEFAULT_CAPACITY_FRAMES,
        }
    }
}

impl FrameBusConfig {
    fn channel_capacity(&self) -> usize {
        self.capacity_frames.max(MIN_CAPACITY_FRAMES)
    }
}

/// Sender half of the frame bus.
#[derive(Clone)]
pub struct FrameBusSender {
    tx: mpsc::Sender<LandmarkFrame>,
    seq_counter: Arc<AtomicU64>,
    dropped_frames: Arc<AtomicU64>,
}

impl FrameBusSender {
    /// Send a frame, dropping it if the bus is full.
    ///
    /// Returns true if sent, false if dropped or the bus is closed.
    pub fn send(&self, ts_ms: i64, detections: impl Into<Arc<[HandDetection]>>) -> bool {
        let seq = self.seq_counter.fetch_add(1, Ordering::Relaxed);
        let frame = LandmarkFrame::new(seq, ts_ms, detections);

        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1;
                // Only log every 10th drop.
                if dropped % 10 == 1 {
                    tracing::warn!(dropped, seq, "Frame bus full, dropping frames");
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Frame bus closed");
                false
            }
        }
    }

    /// Send a frame, waiting until space is available.
    pub async fn send_async(
        &self,
        ts_ms: i64,
        detections: impl Into<Arc<[HandDetection]>>,
    ) -> bool {
        let seq = self.seq_counter.fetch_add(1, Ordering::Relaxed);
        let frame = LandmarkFrame::new(seq, ts_ms, detections);

        match self.tx.send(frame).await {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Frame bus closed");
                false
            }
        }
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }
}

/// Receiver half of the frame bus.
pub struct FrameBusReceiver {
    rx: mpsc::Receiver<LandmarkFrame>,
    last_seq: Option<u64>,
    gaps_detected: u64,
    /// Shared with every sender.
    dropped_frames: Arc<AtomicU64>,
}

impl FrameBusReceiver {
    /// Receive the next frame. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<LandmarkFrame> {
        let frame = self.rx.recv().await?;
        self.track_seq(frame.seq);
        Some(frame)
    }

    fn track_seq(&mut self, seq: u64) {
        if let Some(last) = self.last_seq {
            if seq > last + 1 {
                let gap = seq - last - 1;
                self.gaps_detected += gap;
                tracing::debug!(
                    "Frame bus gap detected: {} frames missing (seq {} -> {})",
                    gap,
                    last,
                    seq
                );
            }
        }
        self.last_seq = Some(seq);
    }

    /// Number of missing frames inferred from sequence gaps.
    pub fn gaps_detected(&self) -> u64 {
        self.gaps_detected
    }

    /// Frames the senders dropped because the bus was full.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }
}

/// Frame bus connecting a landmark producer to the recognizer.
pub struct FrameBus {
    sender: FrameBusSender,
    receiver: Option<FrameBusReceiver>,
}

impl FrameBus {
    pub fn new() -> Self {
        Self::with_config(FrameBusConfig::default())
    }

    pub fn with_config(config: FrameBusConfig) -> Self {
        let capacity = config.channel_capacity();
        let (tx, rx) = mpsc::channel(capacity);
        let dropped_frames = Arc::new(AtomicU64::new(0));

        tracing::debug!("Created frame bus: capacity={} frames", capacity);

        Self {
            sender: FrameBusSender {
                tx,
                seq_counter: Arc::new(AtomicU64::new(0)),
                dropped_frames: Arc::clone(&dropped_frames),
            },
            receiver: Some(FrameBusReceiver {
                rx,
                last_seq: None,
                gaps_detected: 0,
                dropped_frames,
            }),
        }
    }

    pub fn sender(&self) -> FrameBusSender {
        self.sender.clone()
    }

    /// Take the receiver (can only be called once).
    pub fn take_receiver(&mut self) -> Option<FrameBusReceiver> {
        self.receiver.take()
    }

    /// Split into sender and receiver, dropping the bus's own sender handle.
    ///
    /// The receiver closes once the returned sender and its clones are dropped.
    pub fn split(mut self) -> Option<(FrameBusSender, FrameBusReceiver)> {
        let receiver = self.receiver.take()?;
        Some((self.sender, receiver))
    }
}

impl Default for FrameBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Live pipeline metrics, shared via `Arc` and updated without locks.
#[derive(Debug, Default)]
pub struct PipelineStatus {
    /// Frame lag in milliseconds (now - last frame timestamp).
    frame_lag_ms: AtomicI64,
    /// Last classifier call duration in milliseconds.
    inference_time_ms: AtomicU64,
    frames_processed: AtomicU64,
    windows_classified: AtomicU64,
    gestures_committed: AtomicU64,
    /// Frames rejected for breaking the extractor contract.
    frames_rejected: AtomicU64,
    dropped_frames: AtomicU64,
    gaps_detected: AtomicU64,
}

impl PipelineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_lag_ms(&self) -> i64 {
        self.frame_lag_ms.load(Ordering::Relaxed)
    }

    pub fn inference_time_ms(&self) -> u64 {
        self.inference_time_ms.load(Ordering::Relaxed)
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn windows_classified(&self) -> u64 {
        self.windows_classified.load(Ordering::Relaxed)
    }

    pub fn gestures_committed(&self) -> u64 {
        self.gestures_committed.load(Ordering::Relaxed)
    }

    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected.load(Ordering::Relaxed)
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    pub fn gaps_detected(&self) -> u64 {
        self.gaps_detected.load(Ordering::Relaxed)
    }

    pub fn set_inference_time_ms(&self, value: u64) {
        self.inference_time_ms.store(value, Ordering::Relaxed);
    }

    pub fn set_dropped_frames(&self, value: u64) {
        self.dropped_frames.store(value, Ordering::Relaxed);
    }

    pub fn set_gaps_detected(&self, value: u64) {
        self.gaps_detected.store(value, Ordering::Relaxed);
    }

    pub fn increment_frames_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_windows_classified(&self) {
        self.windows_classified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_gestures_committed(&self) {
        self.gestures_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_frames_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Update frame lag from a frame timestamp taken with [`now_ms`].
    pub fn update_lag(&self, frame_ts_ms: i64) {
        self.frame_lag_ms.store(now_ms() - frame_ts_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStatusSnapshot {
        PipelineStatusSnapshot {
            frame_lag_ms: self.frame_lag_ms(),
            inference_time_ms: self.inference_time_ms(),
            frames_processed: self.frames_processed(),
            windows_classified: self.windows_classified(),
            gestures_committed: self.gestures_committed(),
            frames_rejected: self.frames_rejected(),
            dropped_frames: self.dropped_frames(),
            gaps_detected: self.gaps_detected(),
        }
    }
}

/// Point-in-time copy of [`PipelineStatus`] for serialization.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PipelineStatusSnapshot {
    pub frame_lag_ms: i64,
    pub inference_time_ms: u64,
    pub frames_processed: u64,
    pub windows_classified: u64,
    pub gestures_committed: u64,
    pub frames_rejected: u64,
    pub dropped_frames: u64,
    pub gaps_detected: u64,
}
