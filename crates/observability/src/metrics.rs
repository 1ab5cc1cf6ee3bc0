//! 编码管线指标收集模块
//!
//! 基于 EncodingStatistics / TripStatistics 收集和统计管线运行指标。

use contracts::{EncodingStatistics, TripStatistics};
use metrics::{counter, gauge, histogram};

/// 从 EncodingStatistics 记录指标
///
/// 每次统计回调触发 (1 Hz) 时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_encoding_stats;
///
/// pipeline.on_statistics(|stats| {
///     record_encoding_stats(&stats);
/// });
/// ```
pub fn record_encoding_stats(stats: &EncodingStatistics) {
    gauge!("ridecam_encode_bitrate_bps").set(stats.current_bitrate);
    gauge!("ridecam_encode_avg_bitrate_bps").set(stats.average_bitrate);
    gauge!("ridecam_encode_fps").set(stats.fps);
    gauge!("ridecam_encoded_frames").set(stats.encoded_frames as f64);
    gauge!("ridecam_encoded_bytes").set(stats.encoded_bytes as f64);
    gauge!("ridecam_dropped_frames").set(stats.dropped_frames as f64);
    gauge!("ridecam_session_duration_secs").set(stats.duration);

    histogram!("ridecam_encode_bitrate_bps_hist").record(stats.current_bitrate);
    histogram!("ridecam_encode_fps_hist").record(stats.fps);
}

/// 记录一帧被抽帧器处理
pub fn record_frame_decimated(kept: bool) {
    counter!("ridecam_frames_seen_total").increment(1);
    if kept {
        counter!("ridecam_frames_kept_total").increment(1);
    }
}

/// 记录一个已写入文件的编码块
pub fn record_chunk_written(bytes: usize, keyframe: bool) {
    counter!("ridecam_chunks_written_total").increment(1);
    counter!("ridecam_chunk_bytes_total").increment(bytes as u64);
    if keyframe {
        counter!("ridecam_keyframes_total").increment(1);
    }
}

/// 从 TripStatistics 记录行程指标
pub fn record_fused_frame(trip: &TripStatistics) {
    counter!("ridecam_fused_frames_total").increment(1);
    gauge!("ridecam_trip_distance_m").set(trip.total_distance);
    gauge!("ridecam_trip_max_speed_mps").set(trip.max_speed);
    gauge!("ridecam_trip_mean_speed_mps").set(trip.mean_speed);
    gauge!("ridecam_trip_max_accel_g").set(trip.max_acceleration);
}

/// 记录一个提交的精彩片段
pub fn record_segment_committed(duration_secs: f64, mean_confidence: f64) {
    counter!("ridecam_segments_committed_total").increment(1);
    histogram!("ridecam_segment_duration_secs").record(duration_secs);
    histogram!("ridecam_segment_confidence").record(mean_confidence);
}

/// 编码指标聚合器
///
/// 在内存中聚合 1 Hz 统计快照，便于生成运行结束摘要。
#[derive(Debug, Clone, Default)]
pub struct EncodingMetricsAggregator {
    /// 收到的统计快照数
    pub snapshots: u64,

    /// 最后一次快照
    pub last: EncodingStatistics,

    /// 瞬时码率统计
    pub bitrate_stats: RunningStats,

    /// 瞬时帧率统计
    pub fps_stats: RunningStats,
}

impl EncodingMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, stats: &EncodingStatistics) {
        self.snapshots += 1;
        self.last = *stats;
        self.bitrate_stats.push(stats.current_bitrate);
        self.fps_stats.push(stats.fps);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            encoded_frames: self.last.encoded_frames,
            encoded_bytes: self.last.encoded_bytes,
            dropped_frames: self.last.dropped_frames,
            drop_rate: self.last.drop_rate() * 100.0,
            average_bitrate: self.last.average_bitrate,
            duration_secs: self.last.duration,
            bitrate_bps: StatsSummary::from(&self.bitrate_stats),
            fps: StatsSummary::from(&self.fps_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub encoded_frames: u64,
    pub encoded_bytes: u64,
    pub dropped_frames: u64,
    pub drop_rate: f64,
    pub average_bitrate: f64,
    pub duration_secs: f64,
    pub bitrate_bps: StatsSummary,
    pub fps: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Encoding Metrics Summary ===")?;
        writeln!(f, "Encoded frames: {}", self.encoded_frames)?;
        writeln!(f, "Encoded bytes: {}", self.encoded_bytes)?;
        writeln!(
            f,
            "Dropped frames: {} ({:.2}%)",
            self.dropped_frames, self.drop_rate
        )?;
        writeln!(
            f,
            "Average bitrate: {:.2} Mb/s",
            self.average_bitrate / 1_000_000.0
        )?;
        writeln!(f, "Session duration: {:.1}s", self.duration_secs)?;
        writeln!(f, "Bitrate (bps): {}", self.bitrate_bps)?;
        writeln!(f, "FPS: {}", self.fps)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
