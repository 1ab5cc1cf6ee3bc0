//! Per-frame interest scoring.

use contracts::{ContentCategory, ContentEvent, RawFrame};
use tracing::trace;

/// Pixel stride for the frame-difference heuristic
const MOTION_SAMPLE_STRIDE: usize = 10;

/// Pixel stride for the brightness heuristic
const SCENE_SAMPLE_STRIDE: usize = 20;

/// Motion level below this is treated as sensor noise
const MOTION_SIGNIFICANCE: f64 = 0.1;

/// Accumulated score at or above this keeps scene from claiming the category
const SCENE_ACCUMULATION_FLOOR: f64 = 0.3;

const MOTION_WEIGHT: f64 = 0.3;
const OBJECT_WEIGHT: f64 = 0.4;
const SCENE_WEIGHT: f64 = 0.2;
const ACTION_WEIGHT: f64 = 0.1;

/// Grades each frame with a weighted sum of four heuristics
///
/// The category reported on an event is whichever heuristic fired last in
/// motion, object, scene, action order, so a later heuristic overwrites an
/// earlier one. Scene is the exception: its weight always accumulates, but
/// it only claims the category while the total, its own contribution
/// included, is still below `SCENE_ACCUMULATION_FLOOR`. That asymmetry is
/// long-standing observed behavior and is pinned by tests; do not reorder
/// the accumulation.
pub struct ContentScorer {
    previous: Option<RawFrame>,
}

impl ContentScorer {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Score one frame, retaining it as the reference for the next diff
    pub fn score(&mut self, frame: &RawFrame) -> ContentEvent {
        let motion = self.motion_level(frame);
        let scene = scene_quality(frame);

        let mut total = 0.0;
        let mut category = ContentCategory::Motion;

        if motion > MOTION_SIGNIFICANCE {
            total += motion * MOTION_WEIGHT;
            category = ContentCategory::Motion;
        }

        // object detector stub: no signal, weight reserved
        let _ = OBJECT_WEIGHT;

        if let Some(scene_confidence) = scene {
            total += scene_confidence * SCENE_WEIGHT;
            if total < SCENE_ACCUMULATION_FLOOR {
                category = ContentCategory::Scene;
            }
        }

        // action detector stub: no signal, weight reserved
        let _ = ACTION_WEIGHT;

        let confidence = total.clamp(0.0, 1.0);
        trace!(
            timestamp = frame.timestamp,
            motion,
            scene = scene.unwrap_or(0.0),
            confidence,
            "frame scored"
        );

        self.previous = Some(frame.clone());

        ContentEvent {
            timestamp: frame.timestamp,
            confidence,
            category,
            region: None,
        }
    }

    /// Normalized byte difference against the previous frame, sampled
    /// every `MOTION_SAMPLE_STRIDE` pixels
    fn motion_level(&self, frame: &RawFrame) -> f64 {
        let Some(previous) = self.previous.as_ref() else {
            return 0.0;
        };
        if previous.data.len() != frame.data.len() || frame.bytes_per_pixel == 0 {
            return 0.0;
        }

        let bpp = frame.bytes_per_pixel as usize;
        let mut diff_sum = 0u64;
        let mut samples = 0u64;
        for pixel in (0..frame.pixel_count()).step_by(MOTION_SAMPLE_STRIDE) {
            let offset = pixel * bpp;
            if offset >= frame.data.len() {
                break;
            }
            diff_sum += frame.data[offset].abs_diff(previous.data[offset]) as u64;
            samples += 1;
        }

        if samples == 0 {
            0.0
        } else {
            diff_sum as f64 / (samples as f64 * 255.0)
        }
    }
}

impl Default for ContentScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Brightness/contrast heuristic
///
/// Mean luminance is sampled every `SCENE_SAMPLE_STRIDE` pixels; contrast
/// is a fixed placeholder until a real estimator lands. Returns the scene
/// confidence when the frame looks interesting.
fn scene_quality(frame: &RawFrame) -> Option<f64> {
    let bpp = frame.bytes_per_pixel as usize;
    if bpp == 0 || frame.data.is_empty() {
        return None;
    }

    let mut luminance_sum = 0.0;
    let mut samples = 0u64;
    for pixel in (0..frame.pixel_count()).step_by(SCENE_SAMPLE_STRIDE) {
        let offset = pixel * bpp;
        if offset + 2 >= frame.data.len() {
            break;
        }
        let r = frame.data[offset] as f64;
        let g = frame.data[offset + 1] as f64;
        let b = frame.data[offset + 2] as f64;
        luminance_sum += (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
        samples += 1;
    }
    if samples == 0 {
        return None;
    }

    let brightness = luminance_sum / samples as f64;
    let contrast = 0.5; // placeholder until a real contrast estimator lands

    if brightness > 0.3 && brightness < 0.8 && contrast > 0.2 {
        Some((brightness + contrast) / 2.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const WIDTH: u32 = 40;
    const HEIGHT: u32 = 30;

    fn frame(timestamp: f64, fill: u8) -> RawFrame {
        RawFrame {
            timestamp,
            width: WIDTH,
            height: HEIGHT,
            bytes_per_pixel: 4,
            data: Bytes::from(vec![fill; (WIDTH * HEIGHT * 4) as usize]),
        }
    }

    #[test]
    fn test_first_frame_has_no_motion() {
        let mut scorer = ContentScorer::new();
        let event = scorer.score(&frame(0.0, 0));
        assert_eq!(event.confidence, 0.0);
    }

    #[test]
    fn test_static_scene_scores_low() {
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 10));
        let event = scorer.score(&frame(1.0 / 30.0, 10));
        // identical dark frames: no motion, brightness below the window
        assert_eq!(event.confidence, 0.0);
    }

    #[test]
    fn test_large_difference_reads_as_motion() {
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 0));
        let event = scorer.score(&frame(1.0 / 30.0, 230));
        assert_eq!(event.category, ContentCategory::Motion);
        // full-scale byte delta at every sample: motion near 0.9
        assert!(event.confidence > 0.25, "confidence {}", event.confidence);
    }

    #[test]
    fn test_mid_brightness_claims_scene() {
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 128));
        let event = scorer.score(&frame(1.0 / 30.0, 128));
        // no motion; brightness ~0.5 inside the window
        assert_eq!(event.category, ContentCategory::Scene);
        assert!((event.confidence - 0.1).abs() < 0.02, "confidence {}", event.confidence);
    }

    #[test]
    fn test_scene_overwrites_moderate_motion() {
        // moderate motion plus the scene contribution stays under the
        // floor, so the firing scene heuristic takes the category even
        // though motion contributed more. Pinned on purpose.
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 30));
        let event = scorer.score(&frame(1.0 / 30.0, 130));
        assert_eq!(event.category, ContentCategory::Scene);
        // motion 100/255 * 0.3 plus scene ((130/255 + 0.5) / 2) * 0.2
        assert!((event.confidence - 0.2186).abs() < 0.01, "confidence {}", event.confidence);
    }

    fn rgba_frame(timestamp: f64, rgba: [u8; 4]) -> RawFrame {
        let data: Vec<u8> = std::iter::repeat(rgba)
            .take((WIDTH * HEIGHT) as usize)
            .flatten()
            .collect();
        RawFrame {
            timestamp,
            width: WIDTH,
            height: HEIGHT,
            bytes_per_pixel: 4,
            data: Bytes::from(data),
        }
    }

    #[test]
    fn test_saturated_motion_keeps_category() {
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 0));
        // full-scale red delta saturates motion, so the accumulated score
        // sits at the floor before scene fires; scene still adds its
        // weight but no longer claims the category
        let event = scorer.score(&rgba_frame(1.0 / 30.0, [255, 70, 0, 255]));
        assert_eq!(event.category, ContentCategory::Motion);
        // 0.3 from motion plus the in-window scene contribution
        assert!(event.confidence > MOTION_WEIGHT, "confidence {}", event.confidence);
        assert!((event.confidence - 0.396).abs() < 0.01, "confidence {}", event.confidence);
    }

    #[test]
    fn test_scene_crossing_floor_leaves_category() {
        let mut scorer = ContentScorer::new();
        scorer.score(&frame(0.0, 0));
        // motion alone is under the floor; the scene weight pushes the
        // total past it, so scene contributes without taking the category
        let event = scorer.score(&rgba_frame(1.0 / 30.0, [213, 70, 0, 255]));
        assert_eq!(event.category, ContentCategory::Motion);
        // motion 213/255 * 0.3 plus scene ((0.411 + 0.5) / 2) * 0.2
        assert!((event.confidence - 0.3417).abs() < 0.01, "confidence {}", event.confidence);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let mut scorer = ContentScorer::new();
        for i in 0..20 {
            let event = scorer.score(&frame(i as f64 / 30.0, if i % 2 == 0 { 0 } else { 140 }));
            assert!((0.0..=1.0).contains(&event.confidence));
        }
    }
}
