//! 单次加载的分析流程.
//!
//! 1. 分段式扫描整个缓冲区得到 NAL 单元序列
//! 2. 调用外部解码器 (唯一的异步边界), 等待其完成
//! 3. 按位置将切片标签与解码帧对齐, 逐帧累计统计
//! 4. 解码器没有给出帧率时, 回退到 SPS 固定偏移估算

use bytes::Bytes;
use log::{debug, info};
use naluscope_codec::parsers::h264::{
    FrameLabel, FrameTypeStatistics, NaluRecord, SegmentSummary, TimingEstimate, classify_frames,
    find_timing, label_for_frame, segment_cooperative, summarize,
};
use naluscope_codec::{DecodedFrame, FrameDecoder, StreamMetadata};
use naluscope_core::ScopeResult;
use serde::Serialize;

/// 与标签配对后的解码帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// 解码帧
    pub frame: DecodedFrame,
    /// 帧类型标签
    pub label: FrameLabel,
}

/// 帧率来源
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FrameRateSource {
    /// 解码器直接给出
    Decoder {
        /// 帧率 (保留两位小数)
        fps: f64,
    },
    /// SPS 固定偏移估算
    SpsEstimate(TimingEstimate),
    /// 无法确定
    Unknown,
}

impl FrameRateSource {
    /// 优先使用解码器帧率, 否则查找第一个 SPS 估算
    pub fn resolve(metadata: Option<&StreamMetadata>, records: &[NaluRecord]) -> Self {
        if let Some(fps) = metadata.and_then(StreamMetadata::fps) {
            return Self::Decoder { fps };
        }
        match find_timing(records) {
            Some(timing) => Self::SpsEstimate(timing),
            None => Self::Unknown,
        }
    }

    /// 帧率数值
    pub fn fps(&self) -> Option<f64> {
        match self {
            Self::Decoder { fps } => Some(*fps),
            Self::SpsEstimate(timing) => Some(timing.frames_per_second),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for FrameRateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decoder { fps } => write!(f, "{fps} fps"),
            Self::SpsEstimate(timing) => write!(f, "~{} fps (SPS估算)", timing.frames_per_second),
            Self::Unknown => write!(f, "未知"),
        }
    }
}

/// 一次加载的完整分析结果
#[derive(Debug, Clone)]
pub struct StreamAnalysis {
    /// 原始码流
    pub data: Bytes,
    /// 按码流顺序排列的 NAL 单元
    pub records: Vec<NaluRecord>,
    /// 分割概要
    pub summary: SegmentSummary,
    /// 切片推断出的标签序列 (长度等于切片单元数)
    pub slice_labels: Vec<FrameLabel>,
    /// 与标签对齐后的解码帧
    pub frames: Vec<FrameInfo>,
    /// 帧类型统计
    pub statistics: FrameTypeStatistics,
    /// 解码器给出的流级信息
    pub metadata: Option<StreamMetadata>,
    /// 帧率及其来源
    pub frame_rate: FrameRateSource,
}

/// 将解码帧与切片标签按位置配对, 并逐帧累计统计
pub fn align_frames(
    decoded: Vec<DecodedFrame>,
    labels: &[FrameLabel],
    statistics: &mut FrameTypeStatistics,
) -> Vec<FrameInfo> {
    decoded
        .into_iter()
        .enumerate()
        .map(|(index, frame)| {
            let label = label_for_frame(labels, index);
            statistics.record(label);
            FrameInfo { frame, label }
        })
        .collect()
}

/// 分析整个码流
///
/// 码流层面的问题 (截断单元、缺失时序信息) 在本地消化为"未知";
/// 只有解码器失败会作为错误返回.
pub async fn analyze<D: FrameDecoder>(
    data: Bytes,
    decoder: &D,
    yield_every: usize,
) -> ScopeResult<StreamAnalysis> {
    let records = segment_cooperative(&data, yield_every).await;
    let summary = summarize(&records);
    debug!(
        "分割概要: {} 个单元, {} 个截断, 类型分布 {:?}",
        summary.total_units, summary.truncated_units, summary.per_type
    );

    let decoded = decoder.decode(data.clone()).await?;
    info!(
        "解码器 {} 输出 {} 帧, 流信息{}",
        decoder.name(),
        decoded.frames.len(),
        if decoded.metadata.is_some() {
            "可用"
        } else {
            "缺失"
        }
    );

    let slice_labels = classify_frames(&records);
    if !decoded.frames.is_empty() && decoded.frames.len() != slice_labels.len() {
        debug!(
            "解码帧数 {} 与切片数 {} 不一致",
            decoded.frames.len(),
            slice_labels.len()
        );
    }

    let mut statistics = FrameTypeStatistics::new();
    let frames = align_frames(decoded.frames, &slice_labels, &mut statistics);
    let frame_rate = FrameRateSource::resolve(decoded.metadata.as_ref(), &records);

    Ok(StreamAnalysis {
        data,
        records,
        summary,
        slice_labels,
        frames,
        statistics,
        metadata: decoded.metadata,
        frame_rate,
    })
}
