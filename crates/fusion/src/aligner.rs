//! Nearest-timestamp alignment over a fused frame series.

use contracts::FusedFrame;

/// Align query timestamps against a monotonic fused frame series
///
/// For each query, returns the frame whose timestamp is nearest; exact ties
/// resolve to the earlier frame. An empty series yields an empty result.
pub fn align(series: &[FusedFrame], queries: &[f64]) -> Vec<FusedFrame> {
    if series.is_empty() {
        return Vec::new();
    }
    queries
        .iter()
        .map(|&q| series[nearest_index(series, q)])
        .collect()
}

/// Binary search for the index of the nearest timestamp
///
/// Requires `series` sorted by timestamp (the fusion buffer guarantees this).
fn nearest_index(series: &[FusedFrame], query: f64) -> usize {
    let idx = series.partition_point(|f| f.timestamp < query);
    if idx == 0 {
        return 0;
    }
    if idx == series.len() {
        return series.len() - 1;
    }

    let before = query - series[idx - 1].timestamp;
    let after = series[idx].timestamp - query;

    // Ties go to the earlier frame
    if before <= after {
        idx - 1
    } else {
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::PositionalFix;

    fn frame(timestamp: f64) -> FusedFrame {
        FusedFrame {
            timestamp,
            inertial: None,
            fix: PositionalFix {
                timestamp,
                latitude: 47.0,
                longitude: 8.0,
                altitude: 400.0,
                speed: 5.0,
                course: 90.0,
                horizontal_accuracy: 5.0,
                vertical_accuracy: 5.0,
            },
            cumulative_distance: 0.0,
            speed: 5.0,
        }
    }

    #[test]
    fn test_empty_series() {
        assert!(align(&[], &[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_exact_match() {
        let series = vec![frame(1.0), frame(2.0), frame(3.0)];
        let aligned = align(&series, &[2.0]);
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].timestamp, 2.0);
    }

    #[test]
    fn test_nearest_selection() {
        let series = vec![frame(1.0), frame(2.0), frame(3.0)];
        assert_eq!(align(&series, &[1.2])[0].timestamp, 1.0);
        assert_eq!(align(&series, &[1.8])[0].timestamp, 2.0);
        assert_eq!(align(&series, &[2.9])[0].timestamp, 3.0);
    }

    #[test]
    fn test_tie_goes_to_earlier() {
        let series = vec![frame(1.0), frame(3.0)];
        assert_eq!(align(&series, &[2.0])[0].timestamp, 1.0);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let series = vec![frame(1.0), frame(2.0)];
        assert_eq!(align(&series, &[0.0])[0].timestamp, 1.0);
        assert_eq!(align(&series, &[9.0])[0].timestamp, 2.0);
    }

    #[test]
    fn test_query_order_preserved() {
        let series = vec![frame(1.0), frame(2.0), frame(3.0)];
        let aligned = align(&series, &[3.0, 1.0, 2.0]);
        let timestamps: Vec<f64> = aligned.iter().map(|f| f.timestamp).collect();
        assert_eq!(timestamps, vec![3.0, 1.0, 2.0]);
    }
}
