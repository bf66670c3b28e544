//! Handsign - gesture recognition over recorded hand landmarks.
//!
//! Replays a JSON Lines recording through an ONNX sequence model and prints
//! the gestures that pass the stability vote.

mod cli;
mod frames;
mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use handsign_application::{RecognitionSession, RecognitionSettings};
use handsign_bus::{now_ms, FrameBus, PipelineStatus};
use handsign_keypoints::KeypointExtractor;
use handsign_listener::{start_frame_listener, FrameListenerHandle};
use handsign_lstm::LstmClassifier;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::frames::{read_lines, RecordedExtractor};
use crate::render::{probability_bars, ConsoleEventBus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,handsign=debug")),
        )
        .init();

    let mut settings = match &cli.config {
        Some(path) => RecognitionSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => RecognitionSettings::load_default().context("Failed to load settings")?,
    };
    cli.overrides.apply(&mut settings);

    match cli.command {
        Commands::Run { model, frames } => run(&model, &frames, settings).await,
        Commands::Config { write } => {
            settings.validate()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if write {
                let path = cli
                    .config
                    .clone()
                    .unwrap_or_else(RecognitionSettings::default_path);
                settings.save(&path)?;
                println!("Saved settings to {}", path.display());
            }
            Ok(())
        }
    }
}

async fn run(model: &Path, frames: &Path, settings: RecognitionSettings) -> anyhow::Result<()> {
    let lines = read_lines(frames)?;
    tracing::info!(frames = lines.len(), path = %frames.display(), "Loaded recording");

    let classifier = LstmClassifier::load(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    let session = RecognitionSession::new(settings, Arc::new(classifier))?;

    let (sender, receiver) = FrameBus::new()
        .split()
        .context("Frame bus receiver already taken")?;
    let status = Arc::new(PipelineStatus::new());
    let handle = Arc::new(FrameListenerHandle::new());

    let listener = start_frame_listener(
        session,
        receiver,
        Arc::new(ConsoleEventBus),
        Arc::clone(&status),
        Arc::clone(&handle),
    );

    let mut extractor = RecordedExtractor;
    let mut unreadable = 0u64;
    for line in &lines {
        let detections = match extractor.extract(line) {
            Ok(detections) => detections,
            Err(e) => {
                unreadable += 1;
                tracing::warn!(line = line.number, error = %e, "Skipping unreadable frame");
                continue;
            }
        };
        if !sender.send_async(now_ms(), detections).await {
            tracing::warn!("Listener stopped before the recording ended");
            break;
        }
    }
    drop(sender);

    let output = listener.await.context("Frame listener panicked")?;
    if let Some(e) = output.error {
        return Err(e).context("Recognition stopped");
    }

    let session = output.session;
    if let Some(dist) = session.latest_distribution() {
        println!();
        println!("{}", probability_bars(dist));
    }
    println!();
    println!("{}", session.sentence().text());

    let snapshot = status.snapshot();
    tracing::info!(
        frames_processed = snapshot.frames_processed,
        windows_classified = snapshot.windows_classified,
        gestures_committed = snapshot.gestures_committed,
        frames_rejected = snapshot.frames_rejected + unreadable,
        inference_time_ms = snapshot.inference_time_ms,
        "Replay finished"
    );

    Ok(())
}
