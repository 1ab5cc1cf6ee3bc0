//! Pipeline orchestrator - wires capture, ingestion, fusion, encoding and
//! analysis together for one recording run.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use analysis::{ContentScorer, HighlightComposer, ProgressCallback, SegmentSelector, SelectorConfig};
use anyhow::{Context, Result};
use capture::{CaptureCapabilities, CaptureFactory, PermissionSet};
use chrono::Utc;
use contracts::{DropPolicy, RecordingProfile, SensorSample};
use encoder::{PipelineConfig as EncoderConfig, PipelineState, VideoEncodingPipeline};
use fusion::SensorFusionBuffer;
use ingestion::{BackpressureConfig, FrameDecimator, IngestionPipeline};
use observability::EncodingMetricsAggregator;
use tracing::{error, info, warn};

use super::RunStats;

/// Configuration for one recording run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The effective recording profile (after CLI overrides)
    pub profile: RecordingProfile,

    /// Maximum number of kept frames to encode (None = unlimited)
    pub max_frames: Option<u64>,

    /// Recording duration (None = until interrupted)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: RunConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run the recording to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let profile = &self.config.profile;

        // Metrics endpoint (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Capture rig
        info!("Building capture rig...");
        let rig = CaptureFactory::build_rig(
            profile,
            &PermissionSet::granted(),
            &CaptureCapabilities::default(),
        )
        .context("Failed to build capture rig")?;

        info!(
            hdr = rig.effective.hdr,
            stabilization = rig.effective.stabilization,
            "Capture rig ready"
        );

        // Ingestion
        let mut ingestion = IngestionPipeline::new(BackpressureConfig::new(
            profile.frame_queue_capacity,
            profile.sample_queue_capacity,
            DropPolicy::DropNewest,
        ));
        ingestion.register_frame_source(rig.camera);
        ingestion.register_sensor_source(rig.inertial);
        ingestion.register_sensor_source(rig.positional);

        let frame_rx = ingestion
            .take_frame_receiver()
            .context("Failed to get frame receiver")?;
        let sample_rx = ingestion
            .take_sample_receiver()
            .context("Failed to get sample receiver")?;

        // Fusion
        let fusion = Arc::new(SensorFusionBuffer::new());

        // Encoder
        let mut encoder_pipeline = VideoEncodingPipeline::new(EncoderConfig::from_profile(profile));
        let aggregator = Arc::new(Mutex::new(EncodingMetricsAggregator::new()));
        let aggregator_cb = Arc::clone(&aggregator);
        encoder_pipeline.on_statistics(Arc::new(move |stats| {
            info!(
                bitrate_mbps = format!("{:.2}", stats.current_bitrate / 1_000_000.0),
                fps = format!("{:.1}", stats.fps),
                encoded = stats.encoded_frames,
                dropped = stats.dropped_frames,
                "Encoding statistics"
            );
            if let Ok(mut aggregator) = aggregator_cb.lock() {
                aggregator.update(&stats);
            }
        }));
        encoder_pipeline
            .configure(profile.preset)
            .await
            .context("Failed to configure encoding session")?;
        encoder_pipeline.start().context("Failed to start encoder")?;

        info!(
            output = %encoder_pipeline.output_path().map(|p| p.display().to_string()).unwrap_or_default(),
            "Encoding session started"
        );

        // Analysis
        let mut decimator = FrameDecimator::new(profile.skip_frames);
        let mut scorer = ContentScorer::new();
        let mut selector = SegmentSelector::new(SelectorConfig {
            base_threshold: profile.segment_threshold,
        });

        // Start capture
        ingestion.start_all();
        info!(
            max_frames = ?self.config.max_frames,
            duration = ?self.config.duration,
            "Recording"
        );

        let deadline = tokio::time::Instant::now()
            + self
                .config
                .duration
                .unwrap_or(Duration::from_secs(u32::MAX as u64));
        let mut telemetry = tokio::time::interval(Duration::from_secs(1));
        telemetry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        telemetry.tick().await; // immediate first tick

        let mut stats = RunStats::default();
        let mut encoder_failed = false;

        loop {
            tokio::select! {
                frame = frame_rx.recv() => {
                    let Ok(frame) = frame else {
                        warn!("Frame channel closed");
                        break;
                    };
                    stats.frames_captured += 1;
                    if !decimator.should_keep() {
                        continue;
                    }

                    let event = scorer.score(&frame);
                    selector.on_event(event);

                    if let Err(e) = encoder_pipeline.submit_frame(&frame, false).await {
                        error!(error = %e, "Encoder abandoned the session");
                        encoder_failed = true;
                        break;
                    }
                    stats.frames_kept += 1;

                    if let Some(max) = self.config.max_frames {
                        if stats.frames_kept >= max {
                            info!(frames = stats.frames_kept, "Reached max frames limit");
                            break;
                        }
                    }
                }
                sample = sample_rx.recv() => {
                    let Ok(sample) = sample else {
                        warn!("Sample channel closed");
                        break;
                    };
                    stats.samples_ingested += 1;
                    match sample {
                        SensorSample::Inertial(inertial) => fusion.ingest_inertial(inertial),
                        SensorSample::Positional(fix) => {
                            fusion.ingest_positional(fix);
                        }
                    }
                }
                _ = telemetry.tick() => {
                    let trip = fusion.statistics();
                    info!(
                        distance_m = format!("{:.1}", trip.total_distance),
                        mean_speed = format!("{:.2}", trip.mean_speed),
                        fused_frames = trip.sample_count,
                        "Trip telemetry"
                    );
                }
                _ = tokio::time::sleep_until(deadline) => {
                    info!("Duration limit reached");
                    break;
                }
            }
        }

        // Ordered shutdown: sources first, then the encoder, then composition
        info!("Shutting down pipeline...");
        ingestion.stop_all();
        selector.finish();

        let recording_path = match encoder_pipeline.state() {
            PipelineState::Encoding | PipelineState::Paused => {
                match encoder_pipeline.stop().await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "Encoder stop failed");
                        None
                    }
                }
            }
            _ => None,
        };

        let segments = selector.committed_segments().to_vec();
        let mut highlight_path = None;
        if segments.is_empty() {
            info!("No committed segments, skipping highlight composition");
        } else if let Some(ref recording) = recording_path {
            let output = recording.with_file_name(format!(
                "highlight_{}.{}",
                Utc::now().timestamp(),
                profile.codec.file_extension()
            ));
            let progress: ProgressCallback = Arc::new(|fraction| {
                info!(fraction = format!("{:.2}", fraction), "Highlight progress");
            });
            match HighlightComposer::compose(recording, &segments, &output, Some(progress)).await {
                Ok(path) => {
                    info!(path = %path.display(), "Highlight composed");
                    highlight_path = Some(path);
                }
                Err(e) => warn!(error = %e, "Highlight composition failed"),
            }
        }

        stats.duration = start_time.elapsed();
        stats.encoding = match aggregator.lock() {
            Ok(aggregator) => aggregator.summary(),
            Err(_) => Default::default(),
        };
        stats.trip = fusion.statistics();
        stats.ingestion = ingestion.metrics().snapshot();
        stats.segments_committed = segments.len();
        stats.recording_path = recording_path;
        stats.highlight_path = highlight_path;

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            frames_kept = stats.frames_kept,
            segments = stats.segments_committed,
            "Pipeline shutdown complete"
        );

        if encoder_failed {
            anyhow::bail!("Recording aborted: encoder retry budget exhausted");
        }

        Ok(stats)
    }
}
