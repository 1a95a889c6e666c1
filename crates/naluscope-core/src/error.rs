//! 统一错误类型定义.
//!
//! 所有 naluscope crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// naluscope 统一错误类型
#[derive(Debug, Error)]
pub enum ScopeError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// NAL 单元被截断, 起始码之后没有头部字节
    #[error("NAL 单元截断: start_index={start_index}, length={length}, start_code={start_code_len}")]
    TruncatedUnit {
        /// 单元在缓冲区中的起始偏移
        start_index: usize,
        /// 单元总长度 (含起始码)
        length: usize,
        /// 起始码字节数
        start_code_len: usize,
    },

    /// 外部解码器失败
    #[error("解码器错误: {0}")]
    Decoder(String),

    /// 加载已被新的加载或清除操作取代, 结果被丢弃
    #[error("加载已过期: ticket={ticket}, current={current}")]
    StaleLoad {
        /// 提交结果时携带的加载代号
        ticket: u64,
        /// 会话当前的加载代号
        current: u64,
    },

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// naluscope 统一 Result 类型
pub type ScopeResult<T> = Result<T, ScopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_unit_message() {
        let err = ScopeError::TruncatedUnit {
            start_index: 12,
            length: 3,
            start_code_len: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("截断"), "actual={msg}");
        assert!(msg.contains("start_index=12"), "actual={msg}");
    }

    #[test]
    fn test_io_error_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ScopeError = io.into();
        assert!(matches!(err, ScopeError::Io(_)));
    }
}
