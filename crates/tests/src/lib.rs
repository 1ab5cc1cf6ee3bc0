//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实摄像头/传感器硬件）
//! - 管线数据流验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::BitratePreset::HighQuality;
        let _ = contracts::Codec::Hevc;
    }

    #[test]
    fn test_profile_toml_roundtrip() {
        let profile = contracts::RecordingProfile::default();
        let toml = config_loader::ConfigLoader::to_toml(&profile).unwrap();
        let parsed = config_loader::ConfigLoader::load_from_str(
            &toml,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(parsed.skip_frames, profile.skip_frames);
        assert_eq!(parsed.preset, profile.preset);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use capture::{SimulatedCamera, SimulatedCameraConfig, SimulatedGps, SimulatedGpsConfig,
        SimulatedImu, SimulatedImuConfig};
    use contracts::{BitratePreset, EncodedChunk, RawFrame, SensorSample};
    use encoder::{PipelineConfig, VideoEncodingPipeline};
    use fusion::SensorFusionBuffer;
    use ingestion::{BackpressureConfig, FrameDecimator, IngestionPipeline};
    use tempfile::tempdir;

    async fn read_chunks(path: &Path) -> Vec<EncodedChunk> {
        let raw = tokio::fs::read(path).await.unwrap();
        let mut cursor = raw.as_slice();
        let mut chunks = Vec::new();
        while let Some(chunk) = EncodedChunk::read_record(&mut cursor).unwrap() {
            chunks.push(chunk);
        }
        chunks
    }

    /// End-to-end test: SimulatedCamera -> IngestionPipeline -> FrameDecimator
    /// -> VideoEncodingPipeline -> 录制文件
    ///
    /// 验证完整的视频数据流：
    /// 1. 模拟摄像头产生帧
    /// 2. 抽帧器按 1/(skip+1) 比例保留
    /// 3. 编码管线产生 gap-free 的 chunk 序列
    #[tokio::test]
    async fn test_e2e_capture_to_recording() {
        let dir = tempdir().unwrap();

        // 小分辨率 + 高帧率，让测试跑得快
        let camera = SimulatedCamera::new(
            "camera0".to_string(),
            SimulatedCameraConfig {
                fps: 120.0,
                width: 32,
                height: 32,
            },
        );

        let mut ingestion = IngestionPipeline::new(BackpressureConfig::default());
        ingestion.register_frame_source(Box::new(camera));
        let frame_rx = ingestion.take_frame_receiver().unwrap();

        let mut pipeline = VideoEncodingPipeline::new(PipelineConfig {
            encoder: Default::default(),
            output_dir: dir.path().to_path_buf(),
            writer_capacity: 64,
        });
        pipeline.configure(BitratePreset::PowerSaving).await.unwrap();
        pipeline.start().unwrap();

        let mut decimator = FrameDecimator::new(2); // keep 1 in 3
        let target_kept = 10u64;

        ingestion.start_all();

        let run = async {
            while decimator.kept() < target_kept {
                let Ok(frame) = frame_rx.recv().await else {
                    break;
                };
                if decimator.should_keep() {
                    pipeline.submit_frame(&frame, false).await.unwrap();
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("camera stalled");

        ingestion.stop_all();
        let path = pipeline.stop().await.unwrap();

        // 抽帧比例正确
        assert_eq!(decimator.kept(), target_kept);
        assert!(decimator.total() >= target_kept * 3);

        // chunk 序列 gap-free，首块为关键帧
        let chunks = read_chunks(&path).await;
        assert_eq!(chunks.len(), target_kept as usize);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence, i as u64);
        }
        assert!(chunks[0].keyframe);
    }

    /// End-to-end test: SimulatedImu + SimulatedGps -> IngestionPipeline
    /// -> SensorFusionBuffer
    ///
    /// 验证行程统计与时间戳对齐。
    #[tokio::test]
    async fn test_e2e_sensor_fusion_trip() {
        let imu = SimulatedImu::new(
            "imu0".to_string(),
            SimulatedImuConfig {
                frequency_hz: 200.0,
                ..Default::default()
            },
        );
        let gps = SimulatedGps::new(
            "gps0".to_string(),
            SimulatedGpsConfig {
                frequency_hz: 50.0,
                speed_mps: 8.0,
                distance_filter_m: 0.0,
                ..Default::default()
            },
        );

        let mut ingestion = IngestionPipeline::new(BackpressureConfig::default());
        ingestion.register_sensor_source(Box::new(imu));
        ingestion.register_sensor_source(Box::new(gps));
        let sample_rx = ingestion.take_sample_receiver().unwrap();

        let fusion = Arc::new(SensorFusionBuffer::new());

        ingestion.start_all();

        let fusion_feed = Arc::clone(&fusion);
        let run = async move {
            while fusion_feed.len() < 5 {
                let Ok(sample) = sample_rx.recv().await else {
                    break;
                };
                match sample {
                    SensorSample::Inertial(inertial) => fusion_feed.ingest_inertial(inertial),
                    SensorSample::Positional(fix) => {
                        fusion_feed.ingest_positional(fix);
                    }
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("sensors stalled");
        ingestion.stop_all();

        let trip = fusion.statistics();
        assert!(trip.sample_count >= 5);
        assert!(trip.total_distance > 0.0, "no distance accumulated");
        assert!((trip.max_speed - 8.0).abs() < 1e-9);

        // 对齐：每个查询时间戳都能找到最近的 fused frame
        let snapshot = fusion.snapshot();
        let queries: Vec<f64> = snapshot.iter().map(|f| f.timestamp + 0.001).collect();
        let aligned = fusion.align_to_timestamps(&queries);
        assert_eq!(aligned.len(), queries.len());
        for (fused, query) in aligned.iter().zip(&queries) {
            assert!((fused.timestamp - query).abs() < 0.5);
        }
    }

    /// End-to-end test: 评分 -> 片段选择 -> 精彩片段合成
    ///
    /// 帧序列与编码序列共用同一条 30 fps 时间线，保证片段时间窗
    /// 覆盖正确的 chunk 区间。
    #[tokio::test]
    async fn test_e2e_scoring_to_highlight() {
        use analysis::{ContentScorer, HighlightComposer, SegmentSelector, SelectorConfig};

        let dir = tempdir().unwrap();
        let mut pipeline = VideoEncodingPipeline::new(PipelineConfig {
            encoder: Default::default(),
            output_dir: dir.path().to_path_buf(),
            writer_capacity: 64,
        });
        pipeline.configure(BitratePreset::Compression).await.unwrap();
        pipeline.start().unwrap();

        let mut scorer = ContentScorer::new();
        let mut selector = SegmentSelector::new(SelectorConfig::default());

        // 交替黑/亮帧：帧差大（motion 显著），亮度在场景窗口之外，
        // 因此每帧都以 Motion 类别被接受
        for i in 0u64..31 {
            let fill = if i % 2 == 0 { 0u8 } else { 230u8 };
            let frame = RawFrame {
                timestamp: i as f64 / 30.0,
                width: 40,
                height: 30,
                bytes_per_pixel: 4,
                data: Bytes::from(vec![fill; 40 * 30 * 4]),
            };
            let event = scorer.score(&frame);
            selector.on_event(event);
            pipeline.submit_frame(&frame, false).await.unwrap();
        }
        selector.finish();

        let segments = selector.committed_segments().to_vec();
        assert_eq!(segments.len(), 1, "expected one committed segment");
        assert!(segments[0].duration() >= 0.5);

        let recording = pipeline.stop().await.unwrap();
        let highlight = dir.path().join("highlight.mov");
        HighlightComposer::compose(&recording, &segments, &highlight, None)
            .await
            .unwrap();

        let chunks = read_chunks(&highlight).await;
        assert!(!chunks.is_empty());
        // 片段从第一个被接受的帧开始（第 0 帧无前帧，得分为零被拒绝）
        assert_eq!(chunks.first().unwrap().sequence, 1);
        assert!(chunks.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }
}
