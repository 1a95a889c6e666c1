//! 有理数类型, 用于表示解码器上报的帧率 (如 `30000/1001`).

use std::fmt;
use std::str::FromStr;

use crate::error::ScopeError;

/// 有理数, 由分子和分母组成
///
/// ffprobe 以 `r_frame_rate = "num/den"` 的形式给出帧率,
/// 例如 `30000/1001` 表示 29.97fps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 创建新的有理数
    ///
    /// # 参数
    /// - `num`: 分子
    /// - `den`: 分母 (不应为 0)
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// 判断是否有效 (分母不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0
    }

    /// 转换为 f64 浮点数
    ///
    /// 如果分母为 0, 返回 `f64::NAN`.
    pub fn to_f64(self) -> f64 {
        if !self.is_valid() {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 转换为保留两位小数的帧率值
    ///
    /// 分母为 0 或分子为 0 时返回 `None`.
    pub fn to_fps(self) -> Option<f64> {
        if !self.is_valid() || self.num == 0 {
            return None;
        }
        Some(round_to_hundredths(self.to_f64()))
    }
}

/// 四舍五入到两位小数
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = ScopeError;

    /// 解析 `num/den` 或纯整数形式
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| ScopeError::InvalidArgument(format!("有理数解析失败: '{s}', {e}")))
        };
        match s.split_once('/') {
            Some((num, den)) => Ok(Self::new(parse(num)?, parse(den)?)),
            None => Ok(Self::new(parse(s)?, 1)),
        }
    }
}
