//! Annex B 起始码扫描.
//!
//! Annex B 使用起始码 (start code) 分隔 NAL 单元:
//! - 3 字节起始码: `00 00 01`
//! - 4 字节起始码: `00 00 00 01`
//!
//! 同一位置两种起始码都能匹配时, 以 4 字节起始码为准.

use serde::Serialize;

/// 起始码宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StartCode {
    /// `00 00 01`
    Three,
    /// `00 00 00 01`
    Four,
}

impl StartCode {
    /// 起始码字节数
    pub const fn width(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

impl std::fmt::Display for StartCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Three => write!(f, "00 00 01"),
            Self::Four => write!(f, "00 00 00 01"),
        }
    }
}

/// 检查 `index` 处是否为起始码
///
/// 剩余字节不足 3 个时不会匹配.
pub fn find_start_code(data: &[u8], index: usize) -> Option<StartCode> {
    let rest = data.get(index..)?;
    if rest.len() < 3 || rest[0] != 0x00 || rest[1] != 0x00 {
        return None;
    }
    if rest[2] == 0x01 {
        return Some(StartCode::Three);
    }
    if rest.len() >= 4 && rest[2] == 0x00 && rest[3] == 0x01 {
        return Some(StartCode::Four);
    }
    None
}

/// 从 `from` 开始向后查找下一个起始码的位置
///
/// 找不到时返回 `data.len()`, 即最后一个单元延伸到缓冲区末尾.
pub fn find_next_start_code(data: &[u8], from: usize) -> usize {
    let mut i = from;
    while i + 3 <= data.len() {
        if find_start_code(data, i).is_some() {
            return i;
        }
        i += 1;
    }
    data.len()
}
