//! 基于外部 ffmpeg/ffprobe 进程的解码器.
//!
//! 工作流程:
//! 1. 将原始码流写入工作目录的 `input.264`
//! 2. `ffprobe` 读取首个视频流的宽高、帧率、码率 (解析失败时视为无流信息)
//! 3. `ffmpeg` 将每一帧导出为 `frame_%d.png`
//! 4. 按文件名中的数字排序得到帧序列

use std::path::{Path, PathBuf};
use std::process::Output;

use bytes::Bytes;
use log::{debug, warn};
use naluscope_core::{Rational, ScopeError, ScopeResult};
use serde::Deserialize;
use tokio::process::Command;

use crate::decoder::FrameDecoder;
use crate::frame::{DecodeResult, DecodedFrame, StreamMetadata};

/// 写入工作目录的输入文件名
const INPUT_FILE: &str = "input.264";
/// 导出帧文件名前缀
const FRAME_PREFIX: &str = "frame_";

/// 调用外部 ffmpeg/ffprobe 的解码器
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    work_dir: PathBuf,
}

impl FfmpegDecoder {
    /// 创建解码器
    ///
    /// # 参数
    /// - `ffmpeg`/`ffprobe`: 可执行文件路径 (或 PATH 中的名称)
    /// - `work_dir`: 输入文件与导出帧所在目录, 由调用方负责其生命周期
    pub fn new(
        ffmpeg: impl Into<PathBuf>,
        ffprobe: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            work_dir: work_dir.into(),
        }
    }

    /// 工作目录
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn probe_metadata(&self) -> Option<StreamMetadata> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
                INPUT_FILE,
            ])
            .current_dir(&self.work_dir)
            .output()
            .await;

        let output = match output {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!("ffprobe 退出异常: {}", output.status);
                return None;
            }
            Err(e) => {
                warn!("ffprobe 启动失败: {e}");
                return None;
            }
        };

        let text = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_probe_output(&text);
        if metadata.is_none() {
            warn!("解析视频信息失败, 将回退到 SPS 估算");
        }
        metadata
    }

    async fn extract_frames(&self) -> ScopeResult<Vec<DecodedFrame>> {
        remove_stale_frames(&self.work_dir).await?;

        let output = Command::new(&self.ffmpeg)
            .args([
                "-v",
                "error",
                "-y",
                "-i",
                INPUT_FILE,
                "-vf",
                "select=1",
                "-vsync",
                "0",
                "-frame_pts",
                "1",
                "-f",
                "image2",
                "frame_%d.png",
            ])
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|e| ScopeError::Decoder(format!("ffmpeg 启动失败: {e}")))?;
        check_status("ffmpeg", &output)?;

        collect_frames(&self.work_dir).await
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn decode(&self, data: Bytes) -> ScopeResult<DecodeResult> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::write(self.work_dir.join(INPUT_FILE), &data).await?;
        debug!(
            "ffmpeg: 写入输入文件 {} 字节, 工作目录 {}",
            data.len(),
            self.work_dir.display()
        );

        let metadata = self.probe_metadata().await;
        let frames = self.extract_frames().await?;
        debug!("ffmpeg: 导出 {} 帧", frames.len());

        Ok(DecodeResult { frames, metadata })
    }
}

fn check_status(program: &str, output: &Output) -> ScopeResult<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ScopeError::Decoder(format!(
        "{program} 退出异常: {}, {}",
        output.status,
        stderr.trim()
    )))
}

/// ffprobe `-show_streams` JSON 输出
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    bit_rate: Option<String>,
}

/// 解析 ffprobe 的 JSON 输出, 取第一个流
///
/// 输出为空、JSON 非法或没有流时返回 `None`.
pub fn parse_probe_output(text: &str) -> Option<StreamMetadata> {
    if text.trim().is_empty() {
        return None;
    }
    let probe: ProbeOutput = match serde_json::from_str(text) {
        Ok(probe) => probe,
        Err(e) => {
            debug!("ffprobe 输出不是合法 JSON: {e}");
            return None;
        }
    };
    let stream = probe.streams.into_iter().next()?;
    let frame_rate = stream
        .r_frame_rate
        .as_deref()
        .and_then(|s| s.parse::<Rational>().ok())
        .filter(|r| r.to_fps().is_some());
    if let Some(rate) = frame_rate {
        debug!("ffprobe: r_frame_rate={rate}");
    }
    let bit_rate = stream.bit_rate.as_deref().and_then(|s| s.parse().ok());

    Some(StreamMetadata {
        width: stream.width,
        height: stream.height,
        frame_rate,
        bit_rate,
    })
}

/// 提取帧文件名中的数字, 如 `frame_12.png` → 12
pub fn frame_number(name: &str) -> Option<u64> {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

async fn list_frame_names(dir: &Path) -> ScopeResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(FRAME_PREFIX) {
            names.push(name);
        }
    }
    Ok(names)
}

async fn remove_stale_frames(dir: &Path) -> ScopeResult<()> {
    for name in list_frame_names(dir).await? {
        tokio::fs::remove_file(dir.join(&name)).await?;
    }
    Ok(())
}

/// 收集目录中的导出帧, 按文件名数字升序排列
pub async fn collect_frames(dir: &Path) -> ScopeResult<Vec<DecodedFrame>> {
    let mut names = list_frame_names(dir).await?;
    names.sort_by_key(|name| (frame_number(name).unwrap_or(u64::MAX), name.clone()));

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(index, name)| DecodedFrame {
            index,
            path: dir.join(&name),
            name,
        })
        .collect())
}
