//! H.264 Annex B 码流解析集成测试

use bytes::Bytes;
use naluscope::codec::parsers::h264::{
    FrameLabel, FrameTypeStatistics, NalUnitType, StartCode, classify, classify_frames,
    find_timing, segment, segment_cooperative, summarize,
};
use naluscope::core::ScopeError;

// ============================================================
// 辅助函数
// ============================================================

/// 构造带计时信息的 SPS 单元 (4 字节起始码)
fn sps_unit(time_scale: u16, num_units_in_tick: u16) -> Vec<u8> {
    let mut unit = vec![0x00, 0x00, 0x00, 0x01, 0x67];
    unit.extend_from_slice(&[0x42, 0xC0, 0x1E, 0xAB, 0xCD, 0xEF, 0x11, 0x80]);
    unit.extend_from_slice(&time_scale.to_be_bytes());
    unit.extend_from_slice(&num_units_in_tick.to_be_bytes());
    unit
}

/// 构造典型码流: SPS + PPS + IDR + P
fn build_typical_stream() -> Vec<u8> {
    let mut data = sps_unit(2400, 100);
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x68, 0xCE, 0x38, 0x80]);
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x80, 0x40]);
    data.extend_from_slice(&[0x00, 0x00, 0x01, 0x41, 0x9A, 0x01, 0x02]);
    data
}

// ============================================================
// 分割
// ============================================================

#[test]
fn test_typical_stream_segments_exactly() {
    let data = Bytes::from(build_typical_stream());
    let records = segment(&data);

    let types: Vec<u8> = records.iter().filter_map(|r| r.type_id()).collect();
    assert_eq!(types, vec![7, 8, 5, 1], "类型序列应与拼接顺序一致");

    assert_eq!(records[0].start_index, 0);
    assert_eq!(records[0].start_code, StartCode::Four);
    assert_eq!(records[1].start_code, StartCode::Three);
    assert_eq!(records[2].start_code, StartCode::Four);

    // 相邻单元首尾相接, 最后一个单元延伸到缓冲区末尾
    for pair in records.windows(2) {
        assert_eq!(pair[0].start_index + pair[0].length, pair[1].start_index);
    }
    let last = records.last().unwrap();
    assert_eq!(last.start_index + last.length, data.len());

    let summary = summarize(&records);
    assert_eq!(summary.total_units, 4);
    assert_eq!(summary.total_bytes, data.len());
    assert_eq!(summary.truncated_units, 0);
}

#[test]
fn test_segment_is_idempotent() {
    let data = Bytes::from(build_typical_stream());
    assert_eq!(segment(&data), segment(&data));
}

#[test]
fn test_no_start_code_is_empty() {
    let data = Bytes::from_static(&[0x12, 0x34, 0x00, 0x00, 0x02, 0xFF]);
    assert!(segment(&data).is_empty(), "没有起始码时应返回空序列");
    assert!(segment(&Bytes::new()).is_empty());
}

#[test]
fn test_trailing_start_code_is_truncated() {
    let data = Bytes::from_static(&[0x00, 0x00, 0x01, 0x65, 0x88, 0x00, 0x00, 0x01]);
    let records = segment(&data);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].start_index, 5);
    assert_eq!(records[1].length, 3);
    assert!(records[1].is_truncated());

    let err = classify(&records[1]).expect_err("截断单元分类应返回错误");
    assert!(
        matches!(err, ScopeError::TruncatedUnit { start_index: 5, .. }),
        "actual={err}"
    );
    // 其他单元不受影响
    assert_eq!(classify(&records[0]).unwrap().type_id(), 5);
}

#[tokio::test]
async fn test_cooperative_matches_sync() {
    let mut data = Vec::new();
    for _ in 0..64 {
        data.extend_from_slice(&build_typical_stream());
    }
    let data = Bytes::from(data);
    let expected = segment(&data);
    let actual = segment_cooperative(&data, 16).await;
    assert_eq!(actual, expected);
    assert_eq!(actual.len(), 256);
}

// ============================================================
// 分类与帧类型
// ============================================================

#[test]
fn test_header_fields() {
    let data = Bytes::from(build_typical_stream());
    let records = segment(&data);
    let header = classify(&records[3]).unwrap();
    assert_eq!(header.forbidden_bit, 0);
    assert_eq!(header.ref_idc, 2);
    assert_eq!(header.nal_type, NalUnitType::Slice);
    assert_eq!(
        header.describe(),
        "41 - forbidden_bit(1bit): 0, nal_ref_idc(2bits): 2, nal_unit_type(5bits): 1"
    );
}

#[test]
fn test_frame_labels_and_statistics() {
    let data = Bytes::from(build_typical_stream());
    let records = segment(&data);
    let labels = classify_frames(&records);
    assert_eq!(labels, vec![FrameLabel::I, FrameLabel::P]);

    let mut stats = FrameTypeStatistics::new();
    for &label in &labels {
        stats.record(label);
    }
    assert_eq!(stats.percentage(FrameLabel::I), Some(50.0));
    assert_eq!(stats.percentage(FrameLabel::P), Some(50.0));
    assert_eq!(stats.percentage(FrameLabel::B), Some(0.0));
    assert_eq!(stats.to_string(), "I:50.0% P:50.0% B:0.0%");
}

// ============================================================
// SPS 帧率估算
// ============================================================

#[test]
fn test_sps_timing_12_fps() {
    let data = Bytes::from(build_typical_stream());
    let timing = find_timing(&segment(&data)).expect("应能估算帧率");
    assert_eq!(timing.time_scale, 2400);
    assert_eq!(timing.num_units_in_tick, 100);
    assert_eq!(timing.frames_per_second, 12.0);
}

#[test]
fn test_sps_timing_30_fps() {
    let data = Bytes::from(sps_unit(60000, 1000));
    let timing = find_timing(&segment(&data)).expect("应能估算帧率");
    assert_eq!(timing.frames_per_second, 30.0);
}

#[test]
fn test_sps_without_timing_flag() {
    let mut unit = sps_unit(2400, 100);
    unit[12] = 0x00;
    let data = Bytes::from(unit);
    assert!(find_timing(&segment(&data)).is_none());
}
