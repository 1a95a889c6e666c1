//! 日志初始化模块.
//!
//! 双输出:
//! - console: 彩色, 输出到 stderr, 避免与 stdout 上的分析结果 (如 JSON) 混在一起
//! - file: 无色, 默认 info, 可通过 -v/-vv 或 NALUSCOPE_LOG 环境变量调整
//!
//! 日志文件输出到 `{directory}/{prefix}.{date}.log`, 按天滚动.
//! 库 crate 通过 `log` 门面输出, 由 tracing-subscriber 统一接收.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 日志文件级别: 0=info, 1=debug, 2+=trace
pub fn file_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// 控制台级别: 静默模式只输出错误, 否则 0=warn, 1=info, 2+=debug
pub fn console_level(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// 初始化日志系统
///
/// - `directory`: 日志目录, 不存在时自动创建
/// - `file_prefix`: 日志文件前缀 (如 "naluscope-probe")
/// - `verbosity`: 由 -v/-vv 控制
/// - `quiet`: 静默模式
pub fn init(directory: &str, file_prefix: &str, verbosity: u8, quiet: bool) -> Result<()> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("创建日志目录失败, path={directory}"))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .build(directory)
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let console_filter = EnvFilter::new(console_level(verbosity, quiet));
    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(LineFormatter::console())
        .with_filter(console_filter);

    // File: 默认 info, 通过 -v 提升, NALUSCOPE_LOG 环境变量可覆盖
    let file_filter = EnvFilter::try_from_env("NALUSCOPE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(file_level(verbosity)));

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter::file())
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;
    Ok(())
}

/// 日志行格式: `[月-日 时:分:秒.毫秒] 级别 > 消息`
///
/// console 输出带颜色的级别, file 输出无色级别并附加源码位置.
struct LineFormatter {
    console: bool,
}

impl LineFormatter {
    const fn console() -> Self {
        Self { console: true }
    }

    const fn file() -> Self {
        Self { console: false }
    }
}

fn level_color(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::ERROR => "\x1b[31m",
        tracing::Level::WARN => "\x1b[33m",
        tracing::Level::INFO => "\x1b[32m",
        _ => "\x1b[34m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
        )?;
        if self.console {
            write!(writer, "{}{:5}\x1b[0m > ", level_color(*meta.level()), meta.level())?;
        } else {
            write!(
                writer,
                "{:5} {}:{} > ",
                meta.level(),
                meta.file().unwrap_or("unknown"),
                meta.line().unwrap_or(0)
            )?;
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
