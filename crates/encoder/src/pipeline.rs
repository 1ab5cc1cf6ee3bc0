//! Encoding pipeline state machine.
//!
//! Owns one codec, one session and one writer worker, and enforces the
//! lifecycle: `Idle -> Configuring -> Ready -> Encoding <-> Paused ->
//! Stopping -> Idle`. A codec error mid-session triggers a bounded
//! rebuild-and-retry of the same frame before the session is abandoned.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    BitratePreset, DashcamError, EncodingStatistics, RawFrame, RecordingProfile,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::codec::{CodecFactory, EncodeOutcome, SimulatedCodec, VideoCodec};
use crate::session::EncodingSession;
use crate::sinks::FileChunkSink;
use crate::stats::SessionMetrics;
use crate::writer::WriterHandle;

/// Consecutive codec failures tolerated for one frame before the session
/// is abandoned
const MAX_CONSECUTIVE_ENCODE_FAILURES: u32 = 3;

/// Interval between statistics publications
const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle state of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Configuring,
    Ready,
    Encoding,
    Paused,
    Stopping,
    Error,
}

/// Receives a statistics snapshot once per second while encoding
pub type StatisticsCallback = Arc<dyn Fn(EncodingStatistics) + Send + Sync>;

/// Session-independent pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub encoder: contracts::EncoderConfig,
    pub output_dir: PathBuf,
    pub writer_capacity: usize,
}

impl PipelineConfig {
    /// Derive the pipeline configuration from a recording profile
    pub fn from_profile(profile: &RecordingProfile) -> Self {
        Self {
            encoder: profile.encoder_config(),
            output_dir: profile.output_dir.clone(),
            writer_capacity: profile.writer_queue_capacity,
        }
    }
}

/// The video encoding pipeline
pub struct VideoEncodingPipeline {
    config: PipelineConfig,
    codec_factory: CodecFactory,
    state: PipelineState,
    codec: Option<Box<dyn VideoCodec>>,
    session: Option<EncodingSession>,
    writer: Option<WriterHandle>,
    output_path: Option<PathBuf>,
    metrics: Arc<SessionMetrics>,
    stats_task: Option<JoinHandle<()>>,
    stats_callback: Option<StatisticsCallback>,
}

impl VideoEncodingPipeline {
    /// Create an idle pipeline with an explicit codec factory
    pub fn with_codec_factory(config: PipelineConfig, codec_factory: CodecFactory) -> Self {
        Self {
            config,
            codec_factory,
            state: PipelineState::Idle,
            codec: None,
            session: None,
            writer: None,
            output_path: None,
            metrics: Arc::new(SessionMetrics::new()),
            stats_task: None,
            stats_callback: None,
        }
    }

    /// Create an idle pipeline backed by the simulated codec
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_codec_factory(config, SimulatedCodec::factory())
    }

    /// Register the statistics callback before `start`
    pub fn on_statistics(&mut self, callback: StatisticsCallback) {
        self.stats_callback = Some(callback);
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Path of the recording file for the current session, once configured
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Snapshot the session counters
    pub fn statistics(&self) -> EncodingStatistics {
        self.metrics.snapshot()
    }

    /// Build a fresh session: codec, recording file and writer worker
    ///
    /// Reconfiguring tears down any previous session. Failure leaves the
    /// pipeline in `Error`.
    #[instrument(name = "encoder_configure", skip(self), fields(preset = ?preset))]
    pub async fn configure(&mut self, preset: BitratePreset) -> Result<(), DashcamError> {
        self.teardown_session().await;
        self.state = PipelineState::Configuring;
        self.config.encoder.preset = preset;

        let codec = (self.codec_factory)(&self.config.encoder).map_err(|err| {
            self.state = PipelineState::Error;
            DashcamError::session_configuration(format!("codec creation failed: {err}"))
        })?;

        let sink = FileChunkSink::create(&self.config.output_dir, self.config.encoder.codec)
            .await
            .map_err(|err| {
                self.state = PipelineState::Error;
                DashcamError::session_configuration(format!(
                    "recording file creation failed: {err}"
                ))
            })?;

        self.output_path = Some(sink.path().to_path_buf());
        self.metrics.reset();
        self.writer = Some(WriterHandle::spawn(
            sink,
            self.config.writer_capacity,
            Arc::clone(&self.metrics),
        ));
        self.codec = Some(codec);
        self.session = Some(EncodingSession::new(self.config.encoder));
        self.state = PipelineState::Ready;

        info!(
            output = %self.output_path.as_deref().unwrap_or(Path::new("?")).display(),
            "encoding session configured"
        );
        Ok(())
    }

    /// Begin accepting frames and publishing statistics
    pub fn start(&mut self) -> Result<(), DashcamError> {
        if self.state != PipelineState::Ready {
            return Err(DashcamError::NotConfigured);
        }

        let metrics = Arc::clone(&self.metrics);
        let callback = self.stats_callback.clone();
        self.stats_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(STATS_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await; // immediate first tick carries no data
            loop {
                ticker.tick().await;
                let stats = metrics.snapshot();
                observability::record_encoding_stats(&stats);
                if let Some(ref callback) = callback {
                    callback(stats);
                }
            }
        }));

        self.state = PipelineState::Encoding;
        debug!("encoding started");
        Ok(())
    }

    /// Feed one decimated frame into the codec
    ///
    /// A no-op outside the `Encoding` state. On a codec error the codec is
    /// rebuilt from the factory and the same frame re-encoded under its
    /// original metadata; after `MAX_CONSECUTIVE_ENCODE_FAILURES` rebuilds
    /// the session is abandoned and `RetryLimitExceeded` surfaces.
    pub async fn submit_frame(
        &mut self,
        frame: &RawFrame,
        force_keyframe: bool,
    ) -> Result<(), DashcamError> {
        if self.state != PipelineState::Encoding {
            trace!(state = ?self.state, "frame ignored outside Encoding");
            return Ok(());
        }

        let meta = match self.session.as_mut() {
            Some(session) => session.next_meta(force_keyframe),
            None => return Err(DashcamError::NotConfigured),
        };

        loop {
            let outcome = match self.codec.as_mut() {
                Some(codec) => codec.encode(frame, meta),
                None => return Err(DashcamError::NotConfigured),
            };

            match outcome {
                Ok(EncodeOutcome::Chunk(chunk)) => {
                    if let Some(session) = self.session.as_mut() {
                        session.record_success();
                    }
                    match self.writer.as_ref() {
                        Some(writer) => {
                            writer.submit(chunk);
                        }
                        None => return Err(DashcamError::NotConfigured),
                    }
                    return Ok(());
                }
                Ok(EncodeOutcome::NotReady) => {
                    if let Some(session) = self.session.as_mut() {
                        session.record_success();
                    }
                    self.metrics.inc_dropped();
                    trace!(sequence = meta.sequence, "codec produced no output");
                    return Ok(());
                }
                Err(err) => {
                    let attempts = match self.session.as_mut() {
                        Some(session) => session.record_failure(),
                        None => return Err(DashcamError::NotConfigured),
                    };
                    if attempts > MAX_CONSECUTIVE_ENCODE_FAILURES {
                        warn!(
                            sequence = meta.sequence,
                            attempts,
                            "encode retry budget exhausted, abandoning session"
                        );
                        self.teardown_session().await;
                        self.state = PipelineState::Idle;
                        return Err(DashcamError::RetryLimitExceeded { attempts });
                    }
                    warn!(
                        sequence = meta.sequence,
                        attempts,
                        error = %err,
                        "codec error, rebuilding and retrying the frame"
                    );
                    self.codec = Some((self.codec_factory)(&self.config.encoder).map_err(
                        |factory_err| {
                            self.state = PipelineState::Error;
                            DashcamError::session_configuration(format!(
                                "codec rebuild failed: {factory_err}"
                            ))
                        },
                    )?);
                }
            }
        }
    }

    /// Retarget the bitrate without interrupting the session
    pub fn switch_preset(&mut self, preset: BitratePreset) -> Result<(), DashcamError> {
        let Some(codec) = self.codec.as_mut() else {
            return Err(DashcamError::NotConfigured);
        };
        codec.set_bitrate(preset.bits_per_second());
        self.config.encoder.preset = preset;
        if let Some(session) = self.session.as_mut() {
            session.config_mut().preset = preset;
        }
        info!(?preset, "bitrate preset switched");
        Ok(())
    }

    /// Stop accepting frames; the session stays warm
    pub fn pause(&mut self) {
        if self.state == PipelineState::Encoding {
            self.state = PipelineState::Paused;
            debug!("encoding paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == PipelineState::Paused {
            self.state = PipelineState::Encoding;
            debug!("encoding resumed");
        }
    }

    /// Finalize the session and return the recording path
    ///
    /// Drains the codec's trailing chunks, waits for the writer to flush
    /// and close the file, and returns to `Idle`.
    #[instrument(name = "encoder_stop", skip(self))]
    pub async fn stop(&mut self) -> Result<PathBuf, DashcamError> {
        if !matches!(self.state, PipelineState::Encoding | PipelineState::Paused) {
            return Err(DashcamError::NotConfigured);
        }
        self.state = PipelineState::Stopping;

        if let Some(task) = self.stats_task.take() {
            task.abort();
        }
        if let Some(ref callback) = self.stats_callback {
            callback(self.metrics.snapshot());
        }

        let mut drain_result = Ok(());
        if let (Some(codec), Some(writer)) = (self.codec.as_mut(), self.writer.as_ref()) {
            match codec.flush() {
                Ok(trailing) => {
                    for chunk in trailing {
                        writer.submit(chunk);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "codec flush failed, trailing chunks lost");
                    drain_result = Err(err);
                }
            }
        }

        let shutdown_result = match self.writer.take() {
            Some(writer) => writer.shutdown().await,
            None => Ok(()),
        };

        self.codec = None;
        self.session = None;
        self.state = PipelineState::Idle;

        drain_result?;
        shutdown_result?;

        let path = self
            .output_path
            .take()
            .ok_or_else(|| DashcamError::Other("no recording path for the session".into()))?;
        info!(path = %path.display(), "encoding session finalized");
        Ok(path)
    }

    async fn teardown_session(&mut self) {
        if let Some(task) = self.stats_task.take() {
            task.abort();
        }
        if let Some(writer) = self.writer.take() {
            if let Err(err) = writer.shutdown().await {
                warn!(error = %err, "writer shutdown during teardown failed");
            }
        }
        self.codec = None;
        self.session = None;
        self.output_path = None;
    }
}

impl Drop for VideoEncodingPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.stats_task.take() {
            task.abort();
        }
    }
}
