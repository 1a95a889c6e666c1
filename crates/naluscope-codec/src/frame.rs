//! 解码器输出的帧与流信息.

use std::path::PathBuf;

use naluscope_core::Rational;

/// 解码器输出的一帧图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// 帧序号 (从 0 开始, 按解码器编号排序后的位置)
    pub index: usize,
    /// 图像文件名, 如 `frame_1.png`
    pub name: String,
    /// 图像文件完整路径
    pub path: PathBuf,
}

/// 解码器能够直接给出的流级信息
///
/// 每个字段都可能缺失, 分析流程在完全没有这些信息时也必须可用.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamMetadata {
    /// 宽度 (像素)
    pub width: Option<u32>,
    /// 高度 (像素)
    pub height: Option<u32>,
    /// 帧率
    pub frame_rate: Option<Rational>,
    /// 码率 (bits/s)
    pub bit_rate: Option<u64>,
}

impl StreamMetadata {
    /// 帧率 (保留两位小数), 帧率缺失或无效时为 `None`
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.and_then(Rational::to_fps)
    }

    /// 码率 (kb/s, 四舍五入)
    pub fn bit_rate_kbps(&self) -> Option<u64> {
        self.bit_rate.map(|b| b.saturating_add(500) / 1000)
    }
}

/// 一次解码调用的完整结果
#[derive(Debug, Clone, Default)]
pub struct DecodeResult {
    /// 按顺序排列的解码帧
    pub frames: Vec<DecodedFrame>,
    /// 流级信息, 解码器无法确定时为 `None`
    pub metadata: Option<StreamMetadata>,
}
