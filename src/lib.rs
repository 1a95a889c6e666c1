//! # naluscope
//!
//! H.264 Annex B 码流结构分析工具.
//!
//! 对一个原始 H.264 码流文件:
//! - 定位所有 NAL 单元并识别类型
//! - 按切片顺序推断每个解码帧的 I/P 类型, 统计各类型占比
//! - 解码器无法给出帧率时, 从 SPS 固定偏移估算帧率
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use naluscope::SessionState;
//! use naluscope::codec::NullDecoder;
//!
//! # async fn run() -> naluscope::core::ScopeResult<()> {
//! let data = Bytes::from(std::fs::read("sample.h264")?);
//! let mut session = SessionState::new();
//! session.load(data, &NullDecoder, 1024 * 1024).await?;
//! println!("{} 个 NAL 单元", session.records().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `naluscope-core` | 错误类型与基础工具 |
//! | `naluscope-codec` | H.264 码流解析与解码器协作接口 |

/// 核心类型与工具
pub use naluscope_core as core;

/// 码流解析与解码器接口
pub use naluscope_codec as codec;

pub mod analysis;
pub mod config;
pub mod cursor;
pub mod logging;
pub mod session;

pub use analysis::{FrameInfo, FrameRateSource, StreamAnalysis, analyze};
pub use config::AnalyzerConfig;
pub use cursor::Cursor;
pub use session::{LoadTicket, SessionState};

/// 获取 naluscope 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
