//! Fusion buffer with bounded fused frame history.
//!
//! Inertial samples only refresh a latest-value cache; positional fixes
//! drive emission. History lives in a HeapRb with FIFO eviction so memory
//! stays bounded on long rides.

use std::sync::{Arc, Mutex};

use contracts::{FusedFrame, InertialSample, PositionalFix, TripStatistics};
use observability::RunningStats;
use ringbuf::{traits::*, HeapRb};
use tracing::{debug, warn};

use crate::aligner;
use crate::geo::haversine_distance;

/// Fused frame delivery callback type
pub type FusedFrameCallback = Arc<dyn Fn(&FusedFrame) + Send + Sync>;

/// Default history depth (~2.7 h of fixes at 1 Hz)
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Everything mutated on the ingest path, guarded by one lock
struct FusionState {
    latest_inertial: Option<InertialSample>,
    last_fix: Option<PositionalFix>,
    last_emitted: Option<f64>,
    history: HeapRb<FusedFrame>,
    trip: TripStatistics,
    speed_stats: RunningStats,
    accel_stats: RunningStats,
    evicted_count: u64,
    rejected_count: u64,
}

/// Sensor fusion buffer
///
/// Thread-safe; ingest methods take `&self` so the buffer can be shared
/// between the inertial and positional delivery paths behind one `Arc`.
/// There is no global instance; the orchestrator constructs the buffer and
/// passes it explicitly.
pub struct SensorFusionBuffer {
    state: Mutex<FusionState>,
    subscribers: Mutex<Vec<FusedFrameCallback>>,
}

impl Default for SensorFusionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorFusionBuffer {
    /// Create a buffer with the default history capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a buffer with an explicit history capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(FusionState {
                latest_inertial: None,
                last_fix: None,
                last_emitted: None,
                history: HeapRb::new(capacity),
                trip: TripStatistics::default(),
                speed_stats: RunningStats::default(),
                accel_stats: RunningStats::default(),
                evicted_count: 0,
                rejected_count: 0,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber notified on every emitted fused frame
    pub fn subscribe(&self, callback: FusedFrameCallback) {
        self.subscribers.lock().unwrap().push(callback);
    }

    /// Ingest one inertial sample
    ///
    /// Refreshes the latest-value cache only; never emits a frame.
    pub fn ingest_inertial(&self, sample: InertialSample) {
        let mut state = self.state.lock().unwrap();
        state.latest_inertial = Some(sample);
    }

    /// Ingest one positional fix
    ///
    /// Emits exactly one fused frame pairing the fix with the cached
    /// inertial sample, unless the fix is older than the last emitted frame
    /// (rejected to keep history timestamps non-decreasing).
    pub fn ingest_positional(&self, fix: PositionalFix) -> Option<FusedFrame> {
        let fused = {
            let mut state = self.state.lock().unwrap();

            if let Some(last) = state.last_emitted {
                if fix.timestamp < last {
                    state.rejected_count += 1;
                    warn!(
                        fix_timestamp = fix.timestamp,
                        last_emitted = last,
                        "Rejecting out-of-order positional fix"
                    );
                    return None;
                }
            }

            // Distance only accumulates across accuracy-gated fix pairs
            if let Some(prev) = state.last_fix {
                if prev.is_accurate() && fix.is_accurate() {
                    state.trip.total_distance += haversine_distance(&prev, &fix);
                } else {
                    debug!(
                        prev_accuracy = prev.horizontal_accuracy,
                        fix_accuracy = fix.horizontal_accuracy,
                        "Skipping distance update for inaccurate fix pair"
                    );
                }
            }

            let speed = fix.speed.max(0.0);
            state.speed_stats.push(speed);
            if let Some(inertial) = state.latest_inertial {
                state.accel_stats.push(inertial.acceleration.magnitude());
            }

            state.trip.max_speed = state.trip.max_speed.max(speed);
            state.trip.mean_speed = state.speed_stats.mean();
            state.trip.mean_acceleration = state.accel_stats.mean();
            state.trip.max_acceleration = state.accel_stats.max();
            state.trip.sample_count += 1;
            if state.trip.started_at.is_none() {
                state.trip.started_at = Some(fix.timestamp);
            }
            state.trip.last_at = Some(fix.timestamp);

            let fused = FusedFrame {
                timestamp: fix.timestamp,
                inertial: state.latest_inertial,
                fix,
                cumulative_distance: state.trip.total_distance,
                speed,
            };

            if state.history.is_full() {
                let _ = state.history.try_pop();
                state.evicted_count += 1;
            }
            let _ = state.history.try_push(fused);

            state.last_fix = Some(fix);
            state.last_emitted = Some(fix.timestamp);

            observability::record_fused_frame(&state.trip);
            fused
        };

        // Subscribers run outside the state lock
        let subscribers = self.subscribers.lock().unwrap();
        for callback in subscribers.iter() {
            callback(&fused);
        }

        Some(fused)
    }

    /// Copy out the current history, oldest first
    pub fn snapshot(&self) -> Vec<FusedFrame> {
        let state = self.state.lock().unwrap();
        state.history.iter().copied().collect()
    }

    /// Align query timestamps against a snapshot of the history
    pub fn align_to_timestamps(&self, queries: &[f64]) -> Vec<FusedFrame> {
        let snapshot = self.snapshot();
        aligner::align(&snapshot, queries)
    }

    /// Current trip statistics
    pub fn statistics(&self) -> TripStatistics {
        self.state.lock().unwrap().trip
    }

    /// Number of fused frames currently held
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().history.occupied_len()
    }

    /// Whether no frames have been emitted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frames evicted to keep the history bounded
    pub fn evicted_count(&self) -> u64 {
        self.state.lock().unwrap().evicted_count
    }

    /// Out-of-order fixes rejected
    pub fn rejected_count(&self) -> u64 {
        self.state.lock().unwrap().rejected_count
    }
}
