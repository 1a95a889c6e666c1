//! naluscope-probe - H.264 码流结构探测工具
//!
//! 列出 Annex B 码流中的 NAL 单元, 推断帧类型并统计各类型占比.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use naluscope::{AnalyzerConfig, FrameRateSource, SessionState, StreamAnalysis};
use naluscope_codec::parsers::h264::{FrameLabel, FrameTypeStatistics, SegmentSummary, classify};
use naluscope_codec::{FfmpegDecoder, NullDecoder};
use naluscope_core::format_file_size;

/// H.264 码流结构探测工具
#[derive(Parser, Debug)]
#[command(name = "naluscope-probe", version, about = "H.264 NALU 结构探测工具")]
struct Cli {
    /// 输入文件路径 (H.264 Annex B 原始码流)
    input: PathBuf,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 列出每个 NAL 单元
    #[arg(long)]
    show_nalus: bool,

    /// 列出每个解码帧及其类型
    #[arg(long)]
    show_frames: bool,

    /// 不调用 ffmpeg, 只做码流层面的分析
    #[arg(long)]
    no_decode: bool,

    /// 配置文件 (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// ffmpeg 可执行文件 (覆盖配置)
    #[arg(long)]
    ffmpeg: Option<String>,

    /// ffprobe 可执行文件 (覆盖配置)
    #[arg(long)]
    ffprobe: Option<String>,

    /// 日志目录 (覆盖配置)
    #[arg(long)]
    log_dir: Option<String>,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 静默模式 (只输出探测结果)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    file: FileInfo,
    summary: SegmentSummary,
    statistics: StatisticsInfo,
    frame_rate: FrameRateSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<StreamInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nalus: Option<Vec<NaluInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<FrameEntry>>,
}

/// 文件信息
#[derive(Serialize)]
struct FileInfo {
    filename: String,
    size: u64,
    size_text: String,
}

/// 单个 NAL 单元
#[derive(Serialize)]
struct NaluInfo {
    index: usize,
    start_index: usize,
    length: usize,
    start_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_name: Option<&'static str>,
    /// 头部字段描述, 截断单元为错误信息
    header: String,
    truncated: bool,
}

/// 单个解码帧
#[derive(Serialize)]
struct FrameEntry {
    index: usize,
    name: String,
    label: FrameLabel,
    description: &'static str,
}

/// 帧类型统计
#[derive(Serialize)]
struct StatisticsInfo {
    #[serde(flatten)]
    counts: FrameTypeStatistics,
    i_percent: Option<f64>,
    p_percent: Option<f64>,
    b_percent: Option<f64>,
    text: String,
}

/// 解码器给出的流信息
#[derive(Serialize)]
struct StreamInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_rate_kbps: Option<u64>,
}

// ============================================================
// 主逻辑
// ============================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AnalyzerConfig::load_or_default(cli.config.as_deref())?;
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
    }
    if let Some(ffprobe) = &cli.ffprobe {
        config.ffprobe_path = ffprobe.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_directory = dir.clone();
    }

    naluscope::logging::init(
        &config.log_directory,
        &config.log_prefix,
        cli.verbose,
        cli.quiet,
    )?;

    let input = cli.input.display().to_string();
    if !cli.quiet {
        eprintln!(
            "naluscope-probe 版本 {} -- H.264 码流结构探测工具",
            naluscope::version()
        );
        eprintln!("输入文件: {input}");
    }

    let data = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("无法打开文件 '{input}'"))?;
    let data = Bytes::from(data);
    info!("读取 {} ({})", input, format_file_size(data.len() as u64));

    let mut session = SessionState::new();
    if cli.no_decode {
        session
            .load(data, &NullDecoder, config.yield_every_bytes)
            .await?;
    } else {
        // 导出的帧只在本次运行期间有效, 退出时随目录一起删除
        let work_dir = tempfile::Builder::new()
            .prefix("naluscope-")
            .tempdir()
            .context("创建临时工作目录失败")?;
        debug!("工作目录: {}", work_dir.path().display());
        let decoder = FfmpegDecoder::new(
            &config.ffmpeg_path,
            &config.ffprobe_path,
            work_dir.path(),
        );
        session
            .load(data, &decoder, config.yield_every_bytes)
            .await?;
    }

    let analysis = session
        .analysis()
        .context("加载完成后会话中没有分析结果")?;
    let output = build_output(&cli, &input, analysis);

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("序列化 JSON 失败")?;
        println!("{json}");
    } else {
        print_file_text(&output.file, &output.summary);
        if let Some(nalus) = &output.nalus {
            print_nalus_text(nalus);
        }
        if let Some(frames) = &output.frames {
            print_frames_text(frames);
        }
        print_statistics_text(&output);
    }
    Ok(())
}

fn build_output(cli: &Cli, input: &str, analysis: &StreamAnalysis) -> ProbeOutput {
    let size = analysis.data.len() as u64;
    let statistics = analysis.statistics;

    let nalus = cli.show_nalus.then(|| {
        analysis
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let header = match classify(record) {
                    Ok(header) => header.describe(),
                    Err(e) => e.to_string(),
                };
                NaluInfo {
                    index,
                    start_index: record.start_index,
                    length: record.length,
                    start_code: record.start_code.to_string(),
                    type_id: record.type_id(),
                    type_name: record.nal_type().map(|t| t.name()),
                    header,
                    truncated: record.is_truncated(),
                }
            })
            .collect()
    });

    let frames = cli.show_frames.then(|| {
        analysis
            .frames
            .iter()
            .map(|info| FrameEntry {
                index: info.frame.index,
                name: info.frame.name.clone(),
                label: info.label,
                description: info.label.description(),
            })
            .collect()
    });

    let stream = analysis.metadata.map(|meta| StreamInfo {
        width: meta.width,
        height: meta.height,
        bit_rate_kbps: meta.bit_rate_kbps(),
    });

    ProbeOutput {
        file: FileInfo {
            filename: input.to_string(),
            size,
            size_text: format_file_size(size),
        },
        summary: analysis.summary.clone(),
        statistics: StatisticsInfo {
            counts: statistics,
            i_percent: statistics.percentage(FrameLabel::I),
            p_percent: statistics.percentage(FrameLabel::P),
            b_percent: statistics.percentage(FrameLabel::B),
            text: statistics.to_string(),
        },
        frame_rate: analysis.frame_rate,
        stream,
        nalus,
        frames,
    }
}

/// 文本输出: 文件与分割概要
fn print_file_text(file: &FileInfo, summary: &SegmentSummary) {
    println!("[FILE]");
    println!("  文件名       : {}", file.filename);
    println!("  大小         : {} ({} 字节)", file.size_text, file.size);
    println!("  NAL 单元数   : {}", summary.total_units);
    if summary.truncated_units > 0 {
        println!("  截断单元     : {}", summary.truncated_units);
    }
    for (type_id, count) in &summary.per_type {
        println!("  类型 {type_id:<2}      : {count}");
    }
    println!("[/FILE]");
    println!();
}

/// 文本输出: NAL 单元列表
fn print_nalus_text(nalus: &[NaluInfo]) {
    println!("[NALUS]");
    for nalu in nalus {
        println!(
            "  #{:<5} @{:<10} {:>8} 字节  [{}]  {}  {}",
            nalu.index,
            nalu.start_index,
            nalu.length,
            nalu.start_code,
            nalu.type_name.unwrap_or("-"),
            nalu.header
        );
    }
    println!("[/NALUS]");
    println!();
}

/// 文本输出: 帧列表
fn print_frames_text(frames: &[FrameEntry]) {
    println!("[FRAMES]");
    for frame in frames {
        println!(
            "  #{:<5} {}  {:<16}  {}",
            frame.index, frame.label, frame.description, frame.name
        );
    }
    println!("[/FRAMES]");
    println!();
}

/// 文本输出: 统计与流信息
fn print_statistics_text(output: &ProbeOutput) {
    println!("[STATISTICS]");
    println!("  帧类型       : {}", output.statistics.text);
    println!("  帧率         : {}", output.frame_rate);
    if let Some(stream) = &output.stream {
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            println!("  分辨率       : {w}x{h}");
        }
        if let Some(kbps) = stream.bit_rate_kbps {
            println!("  码率         : {kbps} kb/s");
        }
    }
    println!("[/STATISTICS]");
    println!();
}
