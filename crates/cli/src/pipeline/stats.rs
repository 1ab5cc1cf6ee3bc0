//! Run statistics and the end-of-run summary.

use std::path::PathBuf;
use std::time::Duration;

use contracts::TripStatistics;
use ingestion::MetricsSnapshot;
use observability::MetricsSummary;

/// Statistics from one recording run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Raw frames seen by the decimator
    pub frames_captured: u64,

    /// Frames kept and submitted to the encoder
    pub frames_kept: u64,

    /// Sensor samples delivered to fusion
    pub samples_ingested: u64,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Aggregated 1 Hz encoding statistics
    pub encoding: MetricsSummary,

    /// Trip statistics from the fusion buffer
    pub trip: TripStatistics,

    /// Ingestion channel counters
    pub ingestion: MetricsSnapshot,

    /// Committed highlight segments
    pub segments_committed: usize,

    /// Finalized recording file
    pub recording_path: Option<PathBuf>,

    /// Composed highlight file, when any segment committed
    pub highlight_path: Option<PathBuf>,
}

impl RunStats {
    /// Capture-side frame rate over the run
    pub fn capture_fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_captured as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Effective kept ratio (1 in N)
    pub fn keep_ratio(&self) -> f64 {
        if self.frames_kept > 0 {
            self.frames_captured as f64 / self.frames_kept as f64
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                        Ride Summary                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Capture");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!(
            "   ├─ Frames captured: {} ({:.1} fps)",
            self.frames_captured,
            self.capture_fps()
        );
        println!(
            "   ├─ Frames kept: {} (1 in {:.1})",
            self.frames_kept,
            self.keep_ratio()
        );
        println!(
            "   └─ Queue drops: {} frames, {} samples",
            self.ingestion.frames_dropped, self.ingestion.samples_dropped
        );

        println!("\n🎬 Encoding");
        println!("   ├─ Encoded frames: {}", self.encoding.encoded_frames);
        println!(
            "   ├─ Encoded bytes: {:.2} MB",
            self.encoding.encoded_bytes as f64 / 1_000_000.0
        );
        println!(
            "   ├─ Dropped frames: {} ({:.2}%)",
            self.encoding.dropped_frames, self.encoding.drop_rate
        );
        println!(
            "   ├─ Average bitrate: {:.2} Mb/s",
            self.encoding.average_bitrate / 1_000_000.0
        );
        println!("   └─ Instant bitrate: {}", self.encoding.bitrate_bps);

        println!("\n🚴 Trip");
        println!("   ├─ Distance: {:.1} m", self.trip.total_distance);
        println!(
            "   ├─ Speed: mean {:.2} m/s, max {:.2} m/s",
            self.trip.mean_speed, self.trip.max_speed
        );
        println!(
            "   ├─ Acceleration: mean {:.3} g, max {:.3} g",
            self.trip.mean_acceleration, self.trip.max_acceleration
        );
        println!("   └─ Fused frames: {}", self.trip.sample_count);

        println!("\n🎞  Highlight");
        println!("   ├─ Segments committed: {}", self.segments_committed);
        match &self.highlight_path {
            Some(path) => println!("   └─ Output: {}", path.display()),
            None => println!("   └─ Output: (none)"),
        }

        if let Some(ref path) = self.recording_path {
            println!("\n💾 Recording: {}", path.display());
        }

        println!();
    }
}
