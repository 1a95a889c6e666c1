//! # naluscope-codec
//!
//! H.264 Annex B 码流结构解析, 以及与外部解码器协作的接口.
//!
//! ## 使用示例
//!
//! ```rust
//! use bytes::Bytes;
//! use naluscope_codec::parsers::h264::{classify, classify_frames, segment};
//!
//! let data = Bytes::from_static(&[
//!     0x00, 0x00, 0x00, 0x01, 0x65, 0x88, // IDR
//!     0x00, 0x00, 0x01, 0x41, 0x9A, // P
//! ]);
//! let records = segment(&data);
//! assert_eq!(records.len(), 2);
//! assert_eq!(classify(&records[1]).unwrap().type_id(), 1);
//! assert_eq!(classify_frames(&records).len(), 2);
//! ```

pub mod decoder;
pub mod decoders;
pub mod frame;
pub mod parsers;

// 重导出常用类型
pub use decoder::{FrameDecoder, NullDecoder};
pub use decoders::FfmpegDecoder;
pub use frame::{DecodeResult, DecodedFrame, StreamMetadata};
