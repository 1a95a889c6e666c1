//! 基于切片单元顺序的帧类型推断.
//!
//! 按码流顺序取出所有图像切片 (类型 1 → P, 类型 5 → I),
//! 第 N 个切片对应解码器输出的第 N 帧. 解码器输出的帧多于切片数时,
//! 多出的帧标记为 `?`.

use std::fmt;

use serde::Serialize;

use super::nal::{NalUnitType, NaluRecord};

/// 帧类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameLabel {
    /// 关键帧
    I,
    /// 预测帧
    P,
    /// 双向预测帧 (切片推断不会产生, 仅用于统计)
    B,
    /// 没有对应切片的帧
    #[serde(rename = "?")]
    Unknown,
}

impl FrameLabel {
    /// 单字符表示
    pub fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::P => 'P',
            Self::B => 'B',
            Self::Unknown => '?',
        }
    }

    /// 中文说明
    pub fn description(self) -> &'static str {
        match self {
            Self::I => "I帧 (关键帧)",
            Self::P => "P帧 (预测帧)",
            Self::B => "B帧 (双向预测帧)",
            Self::Unknown => "未知",
        }
    }

    /// 由切片单元类型推断标签, 非切片返回 `None`
    pub fn from_nal_type(nal_type: NalUnitType) -> Option<Self> {
        if !nal_type.is_slice() {
            return None;
        }
        if nal_type.is_idr() {
            Some(Self::I)
        } else {
            Some(Self::P)
        }
    }
}

impl fmt::Display for FrameLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 按码流顺序为每个切片单元生成标签
///
/// 输出长度等于类型为 1 或 5 的单元个数.
pub fn classify_frames(records: &[NaluRecord]) -> Vec<FrameLabel> {
    records
        .iter()
        .filter_map(|r| r.nal_type().and_then(FrameLabel::from_nal_type))
        .collect()
}

/// 第 `frame_index` 个解码帧的标签, 超出切片序列时为 `?`
pub fn label_for_frame(labels: &[FrameLabel], frame_index: usize) -> FrameLabel {
    labels
        .get(frame_index)
        .copied()
        .unwrap_or(FrameLabel::Unknown)
}

/// 帧类型累计统计
///
/// 只统计 I/P/B, `?` 不计入. 百分比每次读取时按当前计数重新计算.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameTypeStatistics {
    /// I 帧计数
    pub i: u64,
    /// P 帧计数
    pub p: u64,
    /// B 帧计数
    pub b: u64,
}

impl FrameTypeStatistics {
    /// 创建空统计
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一帧的标签
    pub fn record(&mut self, label: FrameLabel) {
        match label {
            FrameLabel::I => self.i += 1,
            FrameLabel::P => self.p += 1,
            FrameLabel::B => self.b += 1,
            FrameLabel::Unknown => {}
        }
    }

    /// 指定标签的计数
    pub fn count(&self, label: FrameLabel) -> u64 {
        match label {
            FrameLabel::I => self.i,
            FrameLabel::P => self.p,
            FrameLabel::B => self.b,
            FrameLabel::Unknown => 0,
        }
    }

    /// 已统计的帧总数
    pub fn total(&self) -> u64 {
        self.i + self.p + self.b
    }

    /// 指定标签占比 (0-100), 尚无统计时为 `None`
    pub fn percentage(&self, label: FrameLabel) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.count(label) as f64 / total as f64 * 100.0)
    }

    /// 清空统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for FrameTypeStatistics {
    /// 形如 `I:50.0% P:50.0% B:0.0%`, 没有统计时输出 `-`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return write!(f, "-");
        }
        let parts: Vec<String> = [FrameLabel::I, FrameLabel::P, FrameLabel::B]
            .iter()
            .map(|&label| {
                format!(
                    "{}:{:.1}%",
                    label,
                    self.percentage(label).unwrap_or(0.0)
                )
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
