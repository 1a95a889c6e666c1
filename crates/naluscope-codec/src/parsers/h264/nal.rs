//! H.264 NAL (Network Abstraction Layer) 单元分割与分类.
//!
//! # 分割
//!
//! 从缓冲区起点开始, 每遇到一个起始码就向后查找下一个起始码,
//! 两者之间 (含起始码本身) 即为一个 NAL 单元. 第一个起始码之前的字节被丢弃,
//! 最后一个单元延伸到缓冲区末尾, 不校验内容是否完整.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use bytes::Bytes;
use log::debug;
use naluscope_core::{ScopeError, ScopeResult};
use serde::Serialize;

use super::start_code::{StartCode, find_next_start_code, find_start_code};

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 序列结束
    EndOfSequence,
    /// 流结束
    EndOfStream,
    /// 填充数据
    FillerData,
    /// 数据分区、扩展及保留类型
    Other(u8),
}

impl NalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            1 => Self::Slice,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            10 => Self::EndOfSequence,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            _ => Self::Other(type_id),
        }
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Slice => 1,
            Self::SliceIdr => 5,
            Self::Sei => 6,
            Self::Sps => 7,
            Self::Pps => 8,
            Self::Aud => 9,
            Self::EndOfSequence => 10,
            Self::EndOfStream => 11,
            Self::FillerData => 12,
            Self::Other(id) => *id,
        }
    }

    /// 是否为参与帧类型统计的图像切片 (类型 1 或 5)
    pub fn is_slice(&self) -> bool {
        matches!(self, Self::Slice | Self::SliceIdr)
    }

    /// 是否为关键帧 (IDR)
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::SliceIdr)
    }

    /// 中文类型名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slice => "非IDR图像片",
            Self::SliceIdr => "IDR图像片",
            Self::Sei => "SEI",
            Self::Sps => "SPS",
            Self::Pps => "PPS",
            Self::Aud => "分隔符",
            Self::EndOfSequence => "序列结束",
            Self::EndOfStream => "码流结束",
            Self::FillerData => "填充",
            Self::Other(_) => "未知类型",
        }
    }
}

impl std::fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slice => write!(f, "Slice"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::EndOfSequence => write!(f, "EndOfSeq"),
            Self::EndOfStream => write!(f, "EndOfStream"),
            Self::FillerData => write!(f, "Filler"),
            Self::Other(id) => write!(f, "Other({id})"),
        }
    }
}

/// 解析后的 NAL 头部字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalHeader {
    /// 原始头部字节
    pub byte: u8,
    /// forbidden_zero_bit, 合法码流中应为 0, 这里只报告不拒绝
    pub forbidden_bit: u8,
    /// nal_ref_idc (参考重要性, 0-3)
    pub ref_idc: u8,
    /// NAL 单元类型
    pub nal_type: NalUnitType,
}

impl NalHeader {
    /// 从头部字节解析
    pub fn from_byte(byte: u8) -> Self {
        Self {
            byte,
            forbidden_bit: (byte >> 7) & 0x01,
            ref_idc: (byte >> 5) & 0x03,
            nal_type: NalUnitType::from_type_id(byte & 0x1F),
        }
    }

    /// 类型编号 (0-31)
    pub fn type_id(&self) -> u8 {
        self.nal_type.type_id()
    }

    /// 逐字段描述头部字节
    pub fn describe(&self) -> String {
        format!(
            "{:02x} - forbidden_bit(1bit): {}, nal_ref_idc(2bits): {}, nal_unit_type(5bits): {}",
            self.byte,
            self.forbidden_bit,
            self.ref_idc,
            self.type_id()
        )
    }
}

/// 缓冲区中的一个 NAL 单元
///
/// `data` 是原始缓冲区 `[start_index, start_index + length)` 的零拷贝视图, 包含起始码.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaluRecord {
    /// 起始码在缓冲区中的偏移
    pub start_index: usize,
    /// 从起始码到下一个起始码之前 (或缓冲区末尾) 的字节数
    pub length: usize,
    /// 起始码宽度
    pub start_code: StartCode,
    /// 单元数据 (含起始码)
    pub data: Bytes,
}

impl NaluRecord {
    /// 起始码字节数
    pub fn start_code_len(&self) -> usize {
        self.start_code.width()
    }

    /// 头部字节, 单元被截断时为 `None`
    pub fn header_byte(&self) -> Option<u8> {
        self.data.get(self.start_code_len()).copied()
    }

    /// 类型编号 (0-31), 单元被截断时为 `None`
    pub fn type_id(&self) -> Option<u8> {
        self.header_byte().map(|b| b & 0x1F)
    }

    /// NAL 单元类型, 单元被截断时为 `None`
    pub fn nal_type(&self) -> Option<NalUnitType> {
        self.type_id().map(NalUnitType::from_type_id)
    }

    /// 起始码之后没有头部字节
    pub fn is_truncated(&self) -> bool {
        self.length <= self.start_code_len()
    }

    /// 头部字节之后的载荷 (未去除防竞争字节)
    pub fn payload(&self) -> &[u8] {
        self.data.get(self.start_code_len() + 1..).unwrap_or(&[])
    }
}

/// 读取单元的头部字节并解析各字段
///
/// 单元只有起始码时返回 [`ScopeError::TruncatedUnit`], 不会越界读取.
pub fn classify(record: &NaluRecord) -> ScopeResult<NalHeader> {
    match record.header_byte() {
        Some(byte) if !record.is_truncated() => Ok(NalHeader::from_byte(byte)),
        _ => Err(ScopeError::TruncatedUnit {
            start_index: record.start_index,
            length: record.length,
            start_code_len: record.start_code_len(),
        }),
    }
}

/// Annex B 分割迭代器
///
/// 每次 `next()` 产出一个单元, 记录按 `start_index` 严格递增.
pub struct Segmenter<'a> {
    data: &'a Bytes,
    cursor: usize,
}

impl<'a> Segmenter<'a> {
    /// 从缓冲区起点开始分割
    pub fn new(data: &'a Bytes) -> Self {
        Self { data, cursor: 0 }
    }

    /// 当前游标位置 (已消费的字节数)
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl Iterator for Segmenter<'_> {
    type Item = NaluRecord;

    fn next(&mut self) -> Option<NaluRecord> {
        while self.cursor < self.data.len() {
            let Some(start_code) = find_start_code(self.data, self.cursor) else {
                // 容忍第一个起始码之前的垃圾数据
                self.cursor += 1;
                continue;
            };
            let start = self.cursor;
            let next_start = find_next_start_code(self.data, start + start_code.width());
            self.cursor = next_start;
            return Some(NaluRecord {
                start_index: start,
                length: next_start - start,
                start_code,
                data: self.data.slice(start..next_start),
            });
        }
        None
    }
}

/// 将整个缓冲区分割为有序的 NAL 单元序列
///
/// 没有任何起始码时返回空序列.
pub fn segment(data: &Bytes) -> Vec<NaluRecord> {
    let records: Vec<NaluRecord> = Segmenter::new(data).collect();
    debug!(
        "H.264: 分割完成, {} 字节, {} 个 NAL 单元",
        data.len(),
        records.len()
    );
    records
}

/// 与 [`segment`] 结果相同, 但每消费至少 `yield_every` 字节就让出一次调度
///
/// `yield_every` 为 0 时等同于每个单元之后都让出.
pub async fn segment_cooperative(data: &Bytes, yield_every: usize) -> Vec<NaluRecord> {
    let mut segmenter = Segmenter::new(data);
    let mut records = Vec::new();
    let mut last_yield = 0;

    while let Some(record) = segmenter.next() {
        records.push(record);
        if segmenter.position() - last_yield >= yield_every {
            last_yield = segmenter.position();
            tokio::task::yield_now().await;
        }
    }

    debug!(
        "H.264: 分段式分割完成, {} 字节, {} 个 NAL 单元",
        data.len(),
        records.len()
    );
    records
}

/// 分割结果概要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentSummary {
    /// 单元总数
    pub total_units: usize,
    /// 所有单元的字节总数 (不含首个起始码之前的数据)
    pub total_bytes: usize,
    /// 截断单元数
    pub truncated_units: usize,
    /// 各类型编号的单元数
    pub per_type: BTreeMap<u8, usize>,
}

/// 统计分割结果
pub fn summarize(records: &[NaluRecord]) -> SegmentSummary {
    let mut summary = SegmentSummary {
        total_units: records.len(),
        ..SegmentSummary::default()
    };
    for record in records {
        summary.total_bytes += record.length;
        match record.type_id() {
            Some(id) if !record.is_truncated() => {
                *summary.per_type.entry(id).or_insert(0) += 1;
            }
            _ => summary.truncated_units += 1,
        }
    }
    summary
}
