//! SPS (Sequence Parameter Set) 帧率估算.
//!
//! 仅在解码器无法直接给出帧率时作为兜底使用.
//!
//! # 近似算法
//!
//! 不做 Exp-Golomb 解码, 也不去除防竞争字节 (`00 00 03`), 直接在原始载荷
//! (跳过起始码和头部字节) 的固定偏移读取:
//! - 字节 7 的最高位: `timing_info_present_flag`
//! - 字节 8-9 (大端): `time_scale`
//! - 字节 10-11 (大端): `num_units_in_tick`
//!
//! 只有 profile/level 较小且头部较短的 SPS, 这些偏移才与真实 VUI 字段对齐.
//! 结果是一个估计值, 优先级低于解码器上报的帧率.

use log::debug;
use naluscope_core::rational::round_to_hundredths;
use serde::Serialize;

use super::nal::{NalUnitType, NaluRecord};

/// 载荷必须超过的最小字节数
const MIN_PAYLOAD_LEN: usize = 10;

/// 从 SPS 估算出的时序信息
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingEstimate {
    /// time_scale
    pub time_scale: u32,
    /// num_units_in_tick
    pub num_units_in_tick: u32,
    /// time_scale / (2 * num_units_in_tick), 保留两位小数
    pub frames_per_second: f64,
}

/// 从 SPS 单元估算帧率
///
/// 以下情况返回 `None` (数据不足, 不是错误):
/// - 单元不是 SPS (类型 7) 或被截断
/// - 载荷不超过 10 字节
/// - `timing_info_present_flag` 未置位
/// - `time_scale` 或 `num_units_in_tick` 为 0
pub fn extract_timing(record: &NaluRecord) -> Option<TimingEstimate> {
    if record.nal_type() != Some(NalUnitType::Sps) {
        return None;
    }
    estimate_from_payload(record.payload())
}

/// 在 SPS 载荷 (不含起始码与头部字节) 上执行固定偏移读取
pub fn estimate_from_payload(payload: &[u8]) -> Option<TimingEstimate> {
    if payload.len() <= MIN_PAYLOAD_LEN {
        return None;
    }

    let timing_info_present = payload[7] & 0x80 != 0;
    if !timing_info_present {
        return None;
    }

    // 载荷恰好 11 字节时缺少第 11 字节, 按 0 处理
    let byte_at = |i: usize| u32::from(payload.get(i).copied().unwrap_or(0));
    let time_scale = (byte_at(8) << 8) | byte_at(9);
    let num_units_in_tick = (byte_at(10) << 8) | byte_at(11);
    if time_scale == 0 || num_units_in_tick == 0 {
        return None;
    }

    let fps = f64::from(time_scale) / (2.0 * f64::from(num_units_in_tick));
    let estimate = TimingEstimate {
        time_scale,
        num_units_in_tick,
        frames_per_second: round_to_hundredths(fps),
    };
    debug!(
        "H.264: SPS 估算帧率 {} fps (time_scale={}, num_units_in_tick={})",
        estimate.frames_per_second, time_scale, num_units_in_tick
    );
    Some(estimate)
}

/// 在单元序列中找到第一个 SPS 并估算帧率
pub fn find_timing(records: &[NaluRecord]) -> Option<TimingEstimate> {
    records
        .iter()
        .find(|r| r.nal_type() == Some(NalUnitType::Sps))
        .and_then(extract_timing)
}
