//! 分析器配置.
//!
//! 从可选的 JSON 文件加载, 缺失字段取默认值. 命令行参数可覆盖其中的字段.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,
    /// 分段式扫描的让出间隔 (字节)
    #[serde(default = "default_yield_every")]
    pub yield_every_bytes: usize,
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_yield_every() -> usize {
    1024 * 1024
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "naluscope".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            yield_every_bytes: default_yield_every(),
            log_directory: default_log_directory(),
            log_prefix: default_log_prefix(),
        }
    }
}

impl AnalyzerConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("解析配置文件失败, path={}", path.display()))
    }

    /// 从 JSON 文本解析配置
    pub fn from_json(text: &str) -> Result<Self> {
        let config = serde_json::from_str(text)?;
        Ok(config)
    }

    /// 指定路径时加载文件, 否则使用默认配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
