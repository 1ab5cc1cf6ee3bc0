//! Per-session chunk numbering and keyframe cadence.

use contracts::EncoderConfig;

/// Metadata stamped onto one chunk before encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkMeta {
    /// Gap-free, strictly increasing chunk number
    pub sequence: u64,
    /// Presentation timestamp in seconds, derived from the nominal rate
    pub timestamp: f64,
    /// Whether this chunk must be independently decodable
    pub keyframe: bool,
}

/// Bookkeeping for one encoding session
///
/// Sequence numbers advance exactly once per submitted frame, so a frame
/// that is re-encoded after a codec rebuild keeps its original metadata and
/// the chunk stream stays gap-free.
#[derive(Debug)]
pub struct EncodingSession {
    config: EncoderConfig,
    sequence: u64,
    frames_since_keyframe: u64,
    consecutive_failures: u32,
}

impl EncodingSession {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            sequence: 0,
            frames_since_keyframe: 0,
            consecutive_failures: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EncoderConfig {
        &mut self.config
    }

    /// Claim metadata for the next frame
    ///
    /// The first frame and every `keyframe_interval`-th frame after a
    /// keyframe are keyframes; a forced keyframe resets the cadence.
    pub fn next_meta(&mut self, force_keyframe: bool) -> ChunkMeta {
        let keyframe = force_keyframe
            || self.sequence == 0
            || self.frames_since_keyframe >= self.config.keyframe_interval;

        let meta = ChunkMeta {
            sequence: self.sequence,
            timestamp: self.sequence as f64 / self.config.nominal_fps,
            keyframe,
        };

        self.sequence += 1;
        self.frames_since_keyframe = if keyframe {
            1
        } else {
            self.frames_since_keyframe + 1
        };

        meta
    }

    /// Number of frames submitted so far
    pub fn submitted(&self) -> u64 {
        self.sequence
    }

    /// Record one failed encode attempt, returning the new consecutive count
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    /// A successful encode clears the failure streak
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_gap_free() {
        let mut session = EncodingSession::new(EncoderConfig::default());
        for expected in 0..300u64 {
            assert_eq!(session.next_meta(false).sequence, expected);
        }
    }

    #[test]
    fn test_keyframe_cadence() {
        let mut session = EncodingSession::new(EncoderConfig::default());
        let keyframes: Vec<u64> = (0..400)
            .map(|_| session.next_meta(false))
            .filter(|m| m.keyframe)
            .map(|m| m.sequence)
            .collect();
        assert_eq!(keyframes, vec![0, 120, 240, 360]);
    }

    #[test]
    fn test_forced_keyframe_resets_cadence() {
        let mut session = EncodingSession::new(EncoderConfig::default());
        for _ in 0..50 {
            session.next_meta(false);
        }
        assert!(session.next_meta(true).keyframe);
        // next natural keyframe is 120 frames after the forced one
        let next: Vec<u64> = (0..150)
            .map(|_| session.next_meta(false))
            .filter(|m| m.keyframe)
            .map(|m| m.sequence)
            .collect();
        assert_eq!(next, vec![170]);
    }

    #[test]
    fn test_timestamp_from_nominal_rate() {
        let mut session = EncodingSession::new(EncoderConfig::default());
        session.next_meta(false);
        let second = session.next_meta(false);
        assert!((second.timestamp - 1.0 / 30.0).abs() < 1e-12);

        for _ in 0..28 {
            session.next_meta(false);
        }
        assert!((session.next_meta(false).timestamp - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_failure_streak_resets_on_success() {
        let mut session = EncodingSession::new(EncoderConfig::default());
        assert_eq!(session.record_failure(), 1);
        assert_eq!(session.record_failure(), 2);
        session.record_success();
        assert_eq!(session.record_failure(), 1);
    }
}
