//! Ingestion pipeline main entry

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{
    DropPolicy, FrameCallback, FrameSource, RawFrame, SampleCallback, SensorSample, SensorSource,
};
use tracing::{debug, info, instrument};

use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::handoff::{forward_item, ForwardOutcome};

/// Ingestion pipeline
///
/// Owns the registered capture sources and the two bounded channels leaving
/// the capture layer: raw frames and sensor samples.
pub struct IngestionPipeline {
    /// Registered frame sources
    frame_sources: Vec<Box<dyn FrameSource>>,

    /// Registered sensor sources
    sensor_sources: Vec<Box<dyn SensorSource>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Frame sender (shared by all frame sources)
    frame_tx: Sender<RawFrame>,

    /// Frame receiver
    frame_rx: Option<Receiver<RawFrame>>,

    /// Sample sender (shared by all sensor sources)
    sample_tx: Sender<SensorSample>,

    /// Sample receiver
    sample_rx: Option<Receiver<SensorSample>>,

    /// Eviction handle on the frame channel, present under `DropOldest`
    frame_evict_rx: Option<Receiver<RawFrame>>,

    /// Eviction handle on the sample channel, present under `DropOldest`
    sample_evict_rx: Option<Receiver<SensorSample>>,

    /// Backpressure configuration
    config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create a pipeline with the given backpressure configuration
    pub fn new(config: BackpressureConfig) -> Self {
        let (frame_tx, frame_rx) = bounded(config.frame_capacity);
        let (sample_tx, sample_rx) = bounded(config.sample_capacity);

        // DropOldest pops the head from the producer side, which needs a
        // receiver handle on each channel. The handle keeps the channel
        // open for as long as the callbacks hold a clone.
        let (frame_evict_rx, sample_evict_rx) = match config.drop_policy {
            DropPolicy::DropOldest => (Some(frame_rx.clone()), Some(sample_rx.clone())),
            DropPolicy::DropNewest => (None, None),
        };

        Self {
            frame_sources: Vec::new(),
            sensor_sources: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            frame_tx,
            frame_rx: Some(frame_rx),
            sample_tx,
            sample_rx: Some(sample_rx),
            frame_evict_rx,
            sample_evict_rx,
            config,
        }
    }

    /// Register a frame source
    #[instrument(name = "ingestion_register_frame_source", skip(self, source), fields(source_id = %source.source_id()))]
    pub fn register_frame_source(&mut self, source: Box<dyn FrameSource>) {
        debug!(source_id = %source.source_id(), "registered frame source");
        self.frame_sources.push(source);
    }

    /// Register a sensor source
    #[instrument(name = "ingestion_register_sensor_source", skip(self, source), fields(source_id = %source.source_id()))]
    pub fn register_sensor_source(&mut self, source: Box<dyn SensorSource>) {
        debug!(source_id = %source.source_id(), "registered sensor source");
        self.sensor_sources.push(source);
    }

    /// Start all registered sources
    ///
    /// Source `listen` is idempotent, so repeated calls are safe.
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(
            frame_sources = self.frame_sources.len(),
            sensor_sources = self.sensor_sources.len(),
            "starting all sources"
        );

        for source in &self.frame_sources {
            let source_id = source.source_id().to_string();
            let tx = self.frame_tx.clone();
            let evict_rx = self.frame_evict_rx.clone();
            let metrics = Arc::clone(&self.metrics);
            let policy = self.config.drop_policy;

            let callback: FrameCallback = Arc::new(move |frame| {
                metrics.record_frame_received();
                match forward_item(&tx, evict_rx.as_ref(), frame, &source_id, policy) {
                    ForwardOutcome::DroppedFull | ForwardOutcome::SentAfterEvict => {
                        metrics.record_frame_dropped();
                    }
                    ForwardOutcome::Sent | ForwardOutcome::Closed => {}
                }
            });
            source.listen(callback);
        }

        for source in &self.sensor_sources {
            let source_id = source.source_id().to_string();
            let tx = self.sample_tx.clone();
            let evict_rx = self.sample_evict_rx.clone();
            let metrics = Arc::clone(&self.metrics);
            let policy = self.config.drop_policy;

            let callback: SampleCallback = Arc::new(move |sample: SensorSample| {
                metrics.record_sample_received();
                match forward_item(&tx, evict_rx.as_ref(), sample, &source_id, policy) {
                    ForwardOutcome::DroppedFull | ForwardOutcome::SentAfterEvict => {
                        metrics.record_sample_dropped();
                    }
                    ForwardOutcome::Sent | ForwardOutcome::Closed => {}
                }
            });
            source.listen(callback);
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(
            frame_sources = self.frame_sources.len(),
            sensor_sources = self.sensor_sources.len(),
            "stopping all sources"
        );
        for source in &self.frame_sources {
            if source.is_listening() {
                debug!(source_id = %source.source_id(), "stopping frame source");
                source.stop();
            }
        }
        for source in &self.sensor_sources {
            if source.is_listening() {
                debug!(source_id = %source.source_id(), "stopping sensor source");
                source.stop();
            }
        }
    }

    /// Take the frame receiver
    ///
    /// Note: can only be called once, subsequent calls return None
    pub fn take_frame_receiver(&mut self) -> Option<Receiver<RawFrame>> {
        self.frame_rx.take()
    }

    /// Take the sample receiver
    ///
    /// Note: can only be called once, subsequent calls return None
    pub fn take_sample_receiver(&mut self) -> Option<Receiver<SensorSample>> {
        self.sample_rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Number of registered sources (frame + sensor)
    pub fn source_count(&self) -> usize {
        self.frame_sources.len() + self.sensor_sources.len()
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rand::Rng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Thread-backed frame source for testing
    struct TestFrameSource {
        source_id: String,
        listening: Arc<AtomicBool>,
    }

    impl TestFrameSource {
        fn new(source_id: &str) -> Self {
            Self {
                source_id: source_id.to_string(),
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl FrameSource for TestFrameSource {
        fn source_id(&self) -> &str {
            &self.source_id
        }

        fn listen(&self, callback: FrameCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }

            let listening = Arc::clone(&self.listening);
            std::thread::spawn(move || {
                let mut rng = rand::rng();
                let mut count = 0u64;
                while listening.load(Ordering::Relaxed) {
                    count += 1;
                    let payload: Vec<u8> = (0..64).map(|_| rng.random()).collect();
                    callback(RawFrame {
                        timestamp: count as f64 * 0.033,
                        width: 8,
                        height: 8,
                        bytes_per_pixel: 1,
                        data: Bytes::from(payload),
                    });
                    std::thread::sleep(Duration::from_millis(5));
                }
            });
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_take_receivers_once() {
        let mut pipeline = IngestionPipeline::new(BackpressureConfig::default());
        assert!(pipeline.take_frame_receiver().is_some());
        assert!(pipeline.take_frame_receiver().is_none());
        assert!(pipeline.take_sample_receiver().is_some());
        assert!(pipeline.take_sample_receiver().is_none());
    }

    #[test]
    fn test_registration_count() {
        let mut pipeline = IngestionPipeline::new(BackpressureConfig::default());
        pipeline.register_frame_source(Box::new(TestFrameSource::new("cam0")));
        assert_eq!(pipeline.source_count(), 1);
    }

    #[test]
    fn test_frames_flow_through() {
        let mut pipeline = IngestionPipeline::new(BackpressureConfig::default());
        pipeline.register_frame_source(Box::new(TestFrameSource::new("cam0")));
        let rx = pipeline.take_frame_receiver().unwrap();

        pipeline.start_all();
        std::thread::sleep(Duration::from_millis(100));
        pipeline.stop_all();

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert!(received > 0, "expected frames, got none");
        assert!(pipeline.metrics().snapshot().frames_received > 0);
    }

    #[test]
    fn test_full_queue_drops_and_counts() {
        let config = BackpressureConfig::new(2, 2, contracts::DropPolicy::DropNewest);
        let mut pipeline = IngestionPipeline::new(config);
        pipeline.register_frame_source(Box::new(TestFrameSource::new("cam0")));
        // Receiver is taken but never drained
        let _rx = pipeline.take_frame_receiver().unwrap();

        pipeline.start_all();
        std::thread::sleep(Duration::from_millis(100));
        pipeline.stop_all();

        let snapshot = pipeline.metrics().snapshot();
        assert!(snapshot.frames_dropped > 0, "expected drops on full queue");
        assert_eq!(
            snapshot.frames_received,
            snapshot.frames_dropped + 2,
            "only the queued frames escape the drop counter"
        );
    }

    #[test]
    fn test_drop_oldest_keeps_newest_frames() {
        let config = BackpressureConfig::new(2, 2, contracts::DropPolicy::DropOldest);
        let mut pipeline = IngestionPipeline::new(config);
        pipeline.register_frame_source(Box::new(TestFrameSource::new("cam0")));
        // Receiver is taken but never drained during the run
        let rx = pipeline.take_frame_receiver().unwrap();

        pipeline.start_all();
        std::thread::sleep(Duration::from_millis(100));
        pipeline.stop_all();
        std::thread::sleep(Duration::from_millis(50));

        let snapshot = pipeline.metrics().snapshot();
        assert!(snapshot.frames_dropped > 0, "expected evictions on full queue");
        assert_eq!(snapshot.frames_received, snapshot.frames_dropped + 2);

        // Evictions pop the head, so the queue ends holding the newest
        // frames, the last of which is the final one the source produced
        let mut timestamps = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            timestamps.push(frame.timestamp);
        }
        let expected_last = snapshot.frames_received as f64 * 0.033;
        assert_eq!(timestamps.last().copied(), Some(expected_last));
    }
}
