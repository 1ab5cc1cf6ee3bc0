//! Highlight composition from a finished recording.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::BytesMut;
use contracts::{DashcamError, EncodedChunk, VideoSegment};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

/// Receives fractional progress in (0, 1] after each spliced segment
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Splices committed segments out of a recording into a highlight file
///
/// Output is written to a sibling temp file and renamed into place, so a
/// failed composition never leaves a half-written highlight behind.
pub struct HighlightComposer;

impl HighlightComposer {
    /// Copy the chunk records inside each committed segment, in
    /// chronological order, into `output`
    ///
    /// # Errors
    /// `Composition` when `segments` is empty; `Export` when writing or
    /// publishing the highlight fails.
    #[instrument(name = "compose_highlight", skip_all, fields(segments = segments.len()))]
    pub async fn compose(
        recording: &Path,
        segments: &[VideoSegment],
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, DashcamError> {
        if segments.is_empty() {
            return Err(DashcamError::composition(
                "no committed segments to compose",
            ));
        }

        let mut ordered = segments.to_vec();
        ordered.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let raw = tokio::fs::read(recording).await?;
        let mut cursor = raw.as_slice();
        let mut chunks = Vec::new();
        while let Some(chunk) = EncodedChunk::read_record(&mut cursor)? {
            chunks.push(chunk);
        }

        let temp = temp_path(output);
        let file = File::create(&temp)
            .await
            .map_err(|err| DashcamError::export(format!("highlight temp file: {err}")))?;
        let mut writer = BufWriter::new(file);
        let mut scratch = BytesMut::new();
        let mut copied = 0usize;

        for (index, segment) in ordered.iter().enumerate() {
            for chunk in &chunks {
                if chunk.timestamp >= segment.start_time && chunk.timestamp <= segment.end_time {
                    scratch.clear();
                    scratch.reserve(chunk.record_len());
                    chunk.write_record(&mut scratch);
                    writer
                        .write_all(&scratch)
                        .await
                        .map_err(|err| DashcamError::export(format!("highlight write: {err}")))?;
                    copied += 1;
                }
            }
            let fraction = (index + 1) as f64 / ordered.len() as f64;
            debug!(segment = index, fraction, "segment spliced");
            if let Some(ref progress) = progress {
                progress(fraction);
            }
        }

        writer
            .flush()
            .await
            .map_err(|err| DashcamError::export(format!("highlight flush: {err}")))?;
        tokio::fs::rename(&temp, output)
            .await
            .map_err(|err| DashcamError::export(format!("highlight publish: {err}")))?;

        info!(
            path = %output.display(),
            chunks = copied,
            "highlight composed"
        );
        Ok(output.to_path_buf())
    }
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn chunk(sequence: u64) -> EncodedChunk {
        EncodedChunk {
            sequence,
            timestamp: sequence as f64 / 30.0,
            keyframe: sequence % 120 == 0,
            data: Bytes::from(vec![sequence as u8; 50]),
        }
    }

    async fn write_recording(path: &Path, count: u64) {
        let mut buf = BytesMut::new();
        for sequence in 0..count {
            chunk(sequence).write_record(&mut buf);
        }
        tokio::fs::write(path, &buf).await.unwrap();
    }

    fn segment(start_time: f64, end_time: f64) -> VideoSegment {
        VideoSegment {
            start_time,
            end_time,
            frame_count: 1,
            confidence_sum: 0.5,
        }
    }

    async fn read_sequences(path: &Path) -> Vec<u64> {
        let raw = tokio::fs::read(path).await.unwrap();
        let mut cursor = raw.as_slice();
        let mut sequences = Vec::new();
        while let Some(chunk) = EncodedChunk::read_record(&mut cursor).unwrap() {
            sequences.push(chunk.sequence);
        }
        sequences
    }

    #[tokio::test]
    async fn test_copies_only_records_inside_segments() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("recording.mov");
        let output = dir.path().join("highlight.mov");
        write_recording(&recording, 90).await; // 3 s at 30 fps

        // frames 15..=30 and 60..=75
        let segments = vec![segment(0.5, 1.0), segment(2.0, 2.5)];
        HighlightComposer::compose(&recording, &segments, &output, None)
            .await
            .unwrap();

        let sequences = read_sequences(&output).await;
        let expected: Vec<u64> = (15..=30).chain(60..=75).collect();
        assert_eq!(sequences, expected);
    }

    #[tokio::test]
    async fn test_segments_are_spliced_chronologically() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("recording.mov");
        let output = dir.path().join("highlight.mov");
        write_recording(&recording, 90).await;

        // out-of-order input still composes in time order
        let segments = vec![segment(2.0, 2.5), segment(0.5, 1.0)];
        HighlightComposer::compose(&recording, &segments, &output, None)
            .await
            .unwrap();

        let sequences = read_sequences(&output).await;
        assert!(sequences.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*sequences.first().unwrap(), 15);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_complete() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("recording.mov");
        let output = dir.path().join("highlight.mov");
        write_recording(&recording, 90).await;

        let reports = Arc::new(Mutex::new(Vec::new()));
        let reports_clone = Arc::clone(&reports);
        let segments = vec![segment(0.0, 0.5), segment(1.0, 1.5), segment(2.0, 2.5)];
        HighlightComposer::compose(
            &recording,
            &segments,
            &output,
            Some(Arc::new(move |fraction| {
                reports_clone.lock().unwrap().push(fraction);
            })),
        )
        .await
        .unwrap();

        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_no_segments_is_a_composition_error() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("recording.mov");
        let output = dir.path().join("highlight.mov");
        write_recording(&recording, 10).await;

        let err = HighlightComposer::compose(&recording, &[], &output, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DashcamError::Composition { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_failed_publish_leaves_no_partial_output() {
        let dir = tempdir().unwrap();
        let recording = dir.path().join("recording.mov");
        write_recording(&recording, 10).await;

        // output directory does not exist, so the rename fails
        let output = dir.path().join("missing").join("highlight.mov");
        let err = HighlightComposer::compose(&recording, &[segment(0.0, 0.2)], &output, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DashcamError::Export { .. }));
        assert!(!output.exists());
    }
}
