//! Segment selection over scored frames.

use std::collections::VecDeque;

use contracts::{ContentCategory, ContentEvent, VideoSegment};
use tracing::{debug, trace};

/// Trailing window of raw events kept for inspection (seconds)
const EVENT_WINDOW: f64 = 10.0;

/// Shortest committable segment (seconds)
const MIN_SEGMENT_DURATION: f64 = 0.5;

/// Lowest committable mean confidence
const MIN_MEAN_CONFIDENCE: f64 = 0.2;

/// Selector tuning
#[derive(Debug, Clone, Copy)]
pub struct SelectorConfig {
    /// Base acceptance threshold, scaled per category
    pub base_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            base_threshold: 0.3,
        }
    }
}

fn category_multiplier(category: ContentCategory) -> f64 {
    match category {
        ContentCategory::Motion => 0.8,
        ContentCategory::Object => 0.6,
        ContentCategory::Scene => 1.2,
        ContentCategory::Action => 0.5,
    }
}

/// Groups contiguous accepted frames into committed segments
///
/// An accepted event opens or extends the active segment; a rejected event
/// closes it. A closed segment is committed only when it is long enough and
/// confident enough, otherwise it is discarded.
pub struct SegmentSelector {
    config: SelectorConfig,
    active: Option<VideoSegment>,
    committed: Vec<VideoSegment>,
    recent_events: VecDeque<ContentEvent>,
}

impl SegmentSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            active: None,
            committed: Vec::new(),
            recent_events: VecDeque::new(),
        }
    }

    /// Feed one scored frame
    pub fn on_event(&mut self, event: ContentEvent) {
        self.recent_events.push_back(event);
        self.prune_events(event.timestamp);

        let threshold = self.config.base_threshold * category_multiplier(event.category);
        if event.confidence > threshold {
            match self.active.as_mut() {
                Some(segment) => {
                    segment.end_time = event.timestamp;
                    segment.frame_count += 1;
                    segment.confidence_sum += event.confidence;
                }
                None => {
                    trace!(timestamp = event.timestamp, "segment opened");
                    self.active = Some(VideoSegment {
                        start_time: event.timestamp,
                        end_time: event.timestamp,
                        frame_count: 1,
                        confidence_sum: event.confidence,
                    });
                }
            }
        } else {
            self.finalize_active();
        }
    }

    /// Close out the active segment at the end of a run
    pub fn finish(&mut self) {
        self.finalize_active();
    }

    /// Segments committed so far, in chronological order
    pub fn committed_segments(&self) -> &[VideoSegment] {
        &self.committed
    }

    /// Raw events still inside the trailing window
    pub fn recent_event_count(&self) -> usize {
        self.recent_events.len()
    }

    fn finalize_active(&mut self) {
        let Some(segment) = self.active.take() else {
            return;
        };

        if segment.duration() >= MIN_SEGMENT_DURATION
            && segment.mean_confidence() >= MIN_MEAN_CONFIDENCE
        {
            debug!(
                start = segment.start_time,
                duration = segment.duration(),
                mean_confidence = segment.mean_confidence(),
                "segment committed"
            );
            observability::record_segment_committed(segment.duration(), segment.mean_confidence());
            self.committed.push(segment);
        } else {
            trace!(
                start = segment.start_time,
                duration = segment.duration(),
                "segment discarded"
            );
        }
    }

    fn prune_events(&mut self, now: f64) {
        while let Some(front) = self.recent_events.front() {
            if now - front.timestamp > EVENT_WINDOW {
                self.recent_events.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for SegmentSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}
