//! Frame decimation: thins the capture rate down to the encode rate.

use std::sync::Arc;

use tracing::trace;

/// Observer notified with `(kept, total)` on every kept frame
pub type DecimationObserver = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Modulo frame decimator
///
/// With `skip = N`, one frame in every `N + 1` is kept; the kept positions
/// are N+1, 2(N+1), ... in arrival order. The phase is fixed: there is no
/// drift correction against capture timestamps, so a stalled camera stalls
/// the output rather than resampling.
pub struct FrameDecimator {
    skip: u32,
    total: u64,
    kept: u64,
    observer: Option<DecimationObserver>,
}

impl FrameDecimator {
    /// Create a decimator keeping 1 frame in `skip + 1`
    pub fn new(skip: u32) -> Self {
        Self {
            skip,
            total: 0,
            kept: 0,
            observer: None,
        }
    }

    /// Create a decimator with a kept-frame observer
    pub fn with_observer(skip: u32, observer: DecimationObserver) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new(skip)
        }
    }

    /// Account for one arriving frame; returns whether to keep it
    pub fn should_keep(&mut self) -> bool {
        self.total += 1;
        let keep = self.total % (self.skip as u64 + 1) == 0;

        observability::record_frame_decimated(keep);

        if keep {
            self.kept += 1;
            trace!(kept = self.kept, total = self.total, "frame kept");
            if let Some(observer) = &self.observer {
                observer(self.kept, self.total);
            }
        }

        keep
    }

    /// Frames seen so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Frames kept so far
    pub fn kept(&self) -> u64 {
        self.kept
    }

    /// Configured skip count
    pub fn skip(&self) -> u32 {
        self.skip
    }

    /// Reset counters for a new session
    pub fn reset(&mut self) {
        self.total = 0;
        self.kept = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_skip_nine_keeps_one_in_ten() {
        let mut decimator = FrameDecimator::new(9);
        let mut kept_positions = Vec::new();

        for position in 1..=30u64 {
            if decimator.should_keep() {
                kept_positions.push(position);
            }
        }

        assert_eq!(kept_positions, vec![10, 20, 30]);
        assert_eq!(decimator.kept(), 3);
        assert_eq!(decimator.total(), 30);
    }

    #[test]
    fn test_skip_zero_keeps_all() {
        let mut decimator = FrameDecimator::new(0);
        let kept = (0..10).filter(|_| decimator.should_keep()).count();
        assert_eq!(kept, 10);
    }

    #[test]
    fn test_observer_sees_kept_frames_only() {
        let pairs = Arc::new(Mutex::new(Vec::new()));
        let pairs_clone = Arc::clone(&pairs);
        let mut decimator = FrameDecimator::with_observer(
            4,
            Arc::new(move |kept, total| {
                pairs_clone.lock().unwrap().push((kept, total));
            }),
        );

        for _ in 0..12 {
            decimator.should_keep();
        }

        assert_eq!(*pairs.lock().unwrap(), vec![(1, 5), (2, 10)]);
    }

    #[test]
    fn test_reset() {
        let mut decimator = FrameDecimator::new(1);
        for _ in 0..5 {
            decimator.should_keep();
        }
        decimator.reset();
        assert_eq!(decimator.total(), 0);
        assert_eq!(decimator.kept(), 0);

        // Phase restarts: second frame is the first kept
        assert!(!decimator.should_keep());
        assert!(decimator.should_keep());
    }
}
