//! 解码器协作实现.

pub mod ffmpeg;

pub use ffmpeg::FfmpegDecoder;
