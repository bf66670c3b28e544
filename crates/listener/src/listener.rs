//! Frame bus listener for streaming recognition.
//!
//! Receives landmark frames from the bus and runs them through a
//! [`RecognitionSession`]:
//! - Encoding and buffering happen inline on the listener task
//! - Full windows are classified on the blocking pool, one at a time
//! - Predictions, commits and sentence changes go out on the event bus
//!
//! Frames are handled strictly in arrival order. A window is never classified
//! while the previous one is still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use handsign_application::{FrameOutcome, RecognitionError, RecognitionSession};
use handsign_bus::{FrameBusReceiver, LandmarkFrame, PipelineStatus};
use handsign_events::{
    now_ms, publish, EventBusRef, GestureCommitEvent, LabelProbability, PredictionEvent,
    SentenceEvent, SessionStartedEvent, SessionStoppedEvent,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Controls the frame listener task.
///
/// Each start creates a fresh cancellation token, so stop() followed by a new
/// listener works.
pub struct FrameListenerHandle {
    running: Arc<AtomicBool>,
    cancel_token: Mutex<CancellationToken>,
}

impl FrameListenerHandle {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        if let Ok(token) = self.cancel_token.lock() {
            token.cancel();
        }
        self.running.store(false, Ordering::Release);
    }

    fn start(&self) -> (CancellationToken, Arc<AtomicBool>) {
        let new_token = CancellationToken::new();
        let child = new_token.child_token();

        if let Ok(mut token) = self.cancel_token.lock() {
            *token = new_token;
        }

        self.running.store(true, Ordering::Release);
        (child, Arc::clone(&self.running))
    }
}

impl Default for FrameListenerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// What the listener hands back when it exits.
pub struct ListenerOutput {
    /// The session, with its window, history and sentence as they were at exit.
    pub session: RecognitionSession,
    /// The receiver, so another listener can pick up the same bus.
    pub receiver: FrameBusReceiver,
    /// Fatal error that stopped the listener, if any.
    pub error: Option<RecognitionError>,
}

enum FrameStep {
    Done,
    Cancelled,
}

/// Start the frame listener task.
///
/// The task runs until the handle is stopped, the bus closes, or a fatal
/// (configuration) error occurs. Recoverable errors skip the offending frame.
pub fn start_frame_listener(
    session: RecognitionSession,
    receiver: FrameBusReceiver,
    events: EventBusRef,
    pipeline_status: Arc<PipelineStatus>,
    handle: Arc<FrameListenerHandle>,
) -> JoinHandle<ListenerOutput> {
    let (cancel_token, running_flag) = handle.start();

    tokio::spawn(async move {
        let mut session = session;
        let mut receiver = receiver;
        let mut error = None;

        let started = SessionStartedEvent::new(
            session.classifier().name(),
            session.settings().window_size,
            session.labels().names().map(str::to_string).collect(),
        );
        let session_id = started.session_id.clone();
        publish(events.as_ref(), &started);
        tracing::info!(session_id = %session_id, "Frame listener started");

        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    tracing::info!("Frame listener cancelled");
                    break;
                }
                frame = receiver.recv() => frame,
            };

            let Some(frame) = frame else {
                tracing::info!("Frame bus closed, stopping listener");
                break;
            };

            pipeline_status.update_lag(frame.ts_ms);
            pipeline_status.set_gaps_detected(receiver.gaps_detected());
            pipeline_status.set_dropped_frames(receiver.dropped_frames());

            let ctx = FrameContext {
                session_id: &session_id,
                events: &events,
                status: &pipeline_status,
                cancel: &cancel_token,
            };

            match process_landmark_frame(&mut session, &frame, &ctx).await {
                Ok(FrameStep::Done) => {}
                Ok(FrameStep::Cancelled) => {
                    tracing::info!(seq = frame.seq, "Frame listener cancelled during inference");
                    break;
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(seq = frame.seq, error = %e, "Fatal recognition error");
                    error = Some(e);
                    break;
                }
                Err(e) => {
                    pipeline_status.increment_frames_rejected();
                    tracing::warn!(seq = frame.seq, error = %e, "Skipping frame");
                }
            }

            let processed = session.frames_processed();
            if processed > 0 && processed % 100 == 0 {
                tracing::debug!(frames_processed = processed, "Frame listener progress");
            }
        }

        pipeline_status.set_dropped_frames(receiver.dropped_frames());
        publish(
            events.as_ref(),
            &SessionStoppedEvent {
                session_id: session_id.clone(),
                frames_processed: session.frames_processed(),
                error: error.as_ref().map(|e| e.to_string()),
                ts_ms: now_ms(),
            },
        );

        running_flag.store(false, Ordering::Release);
        tracing::info!(
            session_id = %session_id,
            frames_processed = session.frames_processed(),
            windows_classified = session.windows_classified(),
            "Frame listener stopped"
        );

        ListenerOutput {
            session,
            receiver,
            error,
        }
    })
}

struct FrameContext<'a> {
    session_id: &'a str,
    events: &'a EventBusRef,
    status: &'a PipelineStatus,
    cancel: &'a CancellationToken,
}

#[tracing::instrument(level = "trace", skip_all, fields(seq = frame.seq))]
async fn process_landmark_frame(
    session: &mut RecognitionSession,
    frame: &LandmarkFrame,
    ctx: &FrameContext<'_>,
) -> Result<FrameStep, RecognitionError> {
    let Some(window) = session.ingest(&frame.detections)? else {
        ctx.status.increment_frames_processed();
        return Ok(FrameStep::Done);
    };
    ctx.status.increment_frames_processed();

    let classifier = session.classifier();
    let start = Instant::now();
    let task = tokio::task::spawn_blocking(move || classifier.classify(&window));

    let probabilities = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => return Ok(FrameStep::Cancelled),
        joined = task => joined.map_err(|e| {
            RecognitionError::AdapterContract(format!("inference task failed: {e}"))
        })??,
    };
    ctx.status
        .set_inference_time_ms(start.elapsed().as_millis() as u64);

    let outcome = session.apply_prediction(probabilities)?;
    ctx.status.increment_windows_classified();

    if let FrameOutcome::Classified(prediction) = &outcome {
        let probabilities = session
            .latest_distribution()
            .map(|dist| {
                dist.to_pairs()
                    .into_iter()
                    .map(|(label, probability)| LabelProbability { label, probability })
                    .collect()
            })
            .unwrap_or_default();

        publish(
            ctx.events.as_ref(),
            &PredictionEvent {
                session_id: ctx.session_id.to_string(),
                seq: frame.seq,
                label: prediction.label.name().to_string(),
                probability: prediction.probability,
                probabilities,
                ts_ms: now_ms(),
            },
        );

        if let Some(label) = &prediction.committed {
            ctx.status.increment_gestures_committed();
            tracing::debug!(label = %label, seq = frame.seq, "Gesture committed");
            publish(
                ctx.events.as_ref(),
                &GestureCommitEvent {
                    session_id: ctx.session_id.to_string(),
                    seq: frame.seq,
                    label: label.name().to_string(),
                    probability: prediction.probability,
                    ts_ms: now_ms(),
                },
            );
        }

        if prediction.sentence_changed {
            publish(
                ctx.events.as_ref(),
                &SentenceEvent {
                    session_id: ctx.session_id.to_string(),
                    labels: session.sentence().names(),
                    ts_ms: now_ms(),
                },
            );
        }
    }

    Ok(FrameStep::Done)
}
