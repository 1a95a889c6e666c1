//! 会话加载流程集成测试.
//!
//! 使用内存中的模拟解码器, 不依赖外部 ffmpeg.

use std::path::PathBuf;

use bytes::Bytes;
use naluscope::codec::parsers::h264::FrameLabel;
use naluscope::codec::{DecodeResult, DecodedFrame, FrameDecoder, StreamMetadata};
use naluscope::core::{Rational, ScopeError, ScopeResult};
use naluscope::{FrameRateSource, SessionState};

// ============================================================
// 模拟解码器
// ============================================================

/// 输出固定数量的帧
struct FixedDecoder {
    frames: usize,
    metadata: Option<StreamMetadata>,
}

impl FrameDecoder for FixedDecoder {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn decode(&self, _data: Bytes) -> ScopeResult<DecodeResult> {
        let frames = (0..self.frames)
            .map(|index| DecodedFrame {
                index,
                name: format!("frame_{}.png", index + 1),
                path: PathBuf::from(format!("frame_{}.png", index + 1)),
            })
            .collect();
        Ok(DecodeResult {
            frames,
            metadata: self.metadata,
        })
    }
}

/// 总是失败
struct FailingDecoder;

impl FrameDecoder for FailingDecoder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn decode(&self, _data: Bytes) -> ScopeResult<DecodeResult> {
        Err(ScopeError::Decoder("ffmpeg 退出码 1".into()))
    }
}

/// SPS(12 fps) + PPS + IDR + P
fn sample_stream() -> Bytes {
    Bytes::from_static(&[
        0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E, 0xAB, 0xCD, 0xEF, 0x11, 0x80, 0x09, 0x60,
        0x00, 0x64, // SPS
        0x00, 0x00, 0x01, 0x68, 0xCE, 0x38, 0x80, // PPS
        0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x80, 0x40, // IDR
        0x00, 0x00, 0x01, 0x41, 0x9A, 0x01, 0x02, // P
    ])
}

// ============================================================
// 测试
// ============================================================

#[tokio::test]
async fn test_end_to_end_two_frames() {
    let mut session = SessionState::new();
    let decoder = FixedDecoder {
        frames: 2,
        metadata: None,
    };
    session.load(sample_stream(), &decoder, 8).await.unwrap();

    let types: Vec<u8> = session.records().iter().filter_map(|r| r.type_id()).collect();
    assert_eq!(types, vec![7, 8, 5, 1]);

    let labels: Vec<FrameLabel> = session.frames().iter().map(|f| f.label).collect();
    assert_eq!(labels, vec![FrameLabel::I, FrameLabel::P]);

    let stats = session.statistics();
    assert_eq!(stats.percentage(FrameLabel::I), Some(50.0));
    assert_eq!(stats.percentage(FrameLabel::P), Some(50.0));
    assert_eq!(session.frame_cursor().counter(), "1/2");

    // 解码器没有给出帧率, 回退到 SPS 估算
    let analysis = session.analysis().unwrap();
    match analysis.frame_rate {
        FrameRateSource::SpsEstimate(timing) => assert_eq!(timing.frames_per_second, 12.0),
        other => panic!("应使用 SPS 估算, actual={other:?}"),
    }
}

#[tokio::test]
async fn test_extra_frames_are_unknown() {
    let mut session = SessionState::new();
    let decoder = FixedDecoder {
        frames: 3,
        metadata: None,
    };
    session.load(sample_stream(), &decoder, 1024).await.unwrap();

    assert_eq!(session.frames().len(), 3);
    assert_eq!(session.frames()[2].label, FrameLabel::Unknown);
    // `?` 不计入统计
    assert_eq!(session.statistics().total(), 2);

    session.select_frame(10);
    assert_eq!(session.frame_cursor().index(), 2);
    assert_eq!(session.current_frame().unwrap().frame.name, "frame_3.png");
    assert!(session.previous_frame());
    assert_eq!(session.frame_cursor().counter(), "2/3");
}

#[tokio::test]
async fn test_decoder_metadata_preferred() {
    let mut session = SessionState::new();
    let decoder = FixedDecoder {
        frames: 2,
        metadata: Some(StreamMetadata {
            width: Some(1280),
            height: Some(720),
            frame_rate: Some(Rational::new(25, 1)),
            bit_rate: Some(1_234_567),
        }),
    };
    session.load(sample_stream(), &decoder, 1024).await.unwrap();

    let analysis = session.analysis().unwrap();
    assert_eq!(analysis.frame_rate, FrameRateSource::Decoder { fps: 25.0 });
    let meta = analysis.metadata.unwrap();
    assert_eq!(meta.bit_rate_kbps(), Some(1235));
}

#[tokio::test]
async fn test_decoder_failure_leaves_empty_session() {
    let mut session = SessionState::new();
    session
        .load(sample_stream(), &FixedDecoder { frames: 2, metadata: None }, 1024)
        .await
        .unwrap();
    assert_eq!(session.records().len(), 4);

    let err = session
        .load(sample_stream(), &FailingDecoder, 1024)
        .await
        .expect_err("解码失败应返回错误");
    assert!(format!("{err}").contains("ffmpeg 退出码 1"), "actual={err}");

    // 上一个文件的状态已丢弃, 本次的部分结果也不保留
    assert!(session.analysis().is_none());
    assert!(session.records().is_empty());
    assert!(session.frames().is_empty());
    assert_eq!(session.statistics().total(), 0);
    assert_eq!(session.nalu_cursor().counter(), "0/0");
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_clear_discards_pending_load() {
    let mut session = SessionState::new();
    let ticket = session.begin_load();
    let outcome = naluscope::analyze(
        sample_stream(),
        &FixedDecoder {
            frames: 2,
            metadata: None,
        },
        1024,
    )
    .await;
    session.clear();

    let err = session.commit(ticket, outcome).unwrap_err();
    assert!(matches!(err, ScopeError::StaleLoad { .. }));
    assert!(session.records().is_empty());
}
