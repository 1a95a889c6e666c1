//! 解码器协作接口定义.
//!
//! 码流分析本身不解码像素. 帧图像与流级信息由外部解码器提供,
//! 分析流程只通过 `FrameDecoder` trait 与之交互.

use std::future::Future;

use bytes::Bytes;
use naluscope_core::ScopeResult;

use crate::frame::DecodeResult;

/// 解码器 trait
///
/// 每次加载文件时调用一次 `decode()`, 传入完整的原始字节.
/// 返回的帧序列用于与切片标签按位置对齐; 流级信息可以缺失.
///
/// 解码失败 (`Err`) 视为整次加载失败.
pub trait FrameDecoder: Send + Sync {
    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 解码整个码流
    fn decode(&self, data: Bytes) -> impl Future<Output = ScopeResult<DecodeResult>> + Send;
}

/// 不产生任何帧与流信息的解码器
///
/// 用于只做码流结构分析的场景.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecoder;

impl FrameDecoder for NullDecoder {
    fn name(&self) -> &str {
        "null"
    }

    async fn decode(&self, _data: Bytes) -> ScopeResult<DecodeResult> {
        Ok(DecodeResult::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_decoder_returns_nothing() {
        let result = NullDecoder
            .decode(Bytes::from_static(&[0x00, 0x00, 0x01, 0x65]))
            .await
            .unwrap();
        assert!(result.frames.is_empty());
        assert!(result.metadata.is_none());
        assert_eq!(NullDecoder.name(), "null");
    }
}
