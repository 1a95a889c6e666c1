//! H.264/AVC Annex B 码流解析器.
//!
//! 提供对 H.264 Annex B 码流的结构分析能力:
//! - 起始码扫描与 NAL 单元分割
//! - NAL 头部解析与类型识别
//! - SPS 固定偏移帧率估算
//! - 基于切片顺序的帧类型推断与统计

pub mod frame_type;
pub mod nal;
pub mod sps;
pub mod start_code;

pub use frame_type::{FrameLabel, FrameTypeStatistics, classify_frames, label_for_frame};
pub use nal::{
    NalHeader, NalUnitType, NaluRecord, SegmentSummary, Segmenter, classify, segment,
    segment_cooperative, summarize,
};
pub use sps::{TimingEstimate, extract_timing, find_timing};
pub use start_code::{StartCode, find_next_start_code, find_start_code};
