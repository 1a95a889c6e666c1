//! 会话状态.
//!
//! 当前文件的 NAL 单元序列、帧序列、游标与统计都保存在一个显式的
//! `SessionState` 值中, 由调用方持有并传入各操作, 没有全局可变状态.
//!
//! # 加载与取消
//!
//! 每次加载先通过 [`SessionState::begin_load`] 领取一个 [`LoadTicket`].
//! 清除文件或开始新的加载都会使旧票据失效; 用过期票据提交的结果会被丢弃,
//! 不会混入当前状态.

use bytes::Bytes;
use log::{debug, warn};
use naluscope_codec::FrameDecoder;
use naluscope_codec::parsers::h264::{FrameTypeStatistics, NaluRecord};
use naluscope_core::{ScopeError, ScopeResult};

use crate::analysis::{FrameInfo, StreamAnalysis, analyze};
use crate::cursor::Cursor;

/// 加载票据, 记录发起加载时的会话代号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// 票据代号
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// 会话状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    generation: u64,
    loading: bool,
    analysis: Option<StreamAnalysis>,
    nalu_cursor: Cursor,
    frame_cursor: Cursor,
}

impl SessionState {
    /// 创建空会话
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一次新的加载
    ///
    /// 丢弃当前文件的全部状态, 并使此前发出的票据失效.
    pub fn begin_load(&mut self) -> LoadTicket {
        if self.loading {
            debug!("会话: 新加载取代未完成的加载, generation={}", self.generation);
        }
        self.reset();
        self.loading = true;
        LoadTicket(self.generation)
    }

    /// 提交一次加载的结果
    ///
    /// - 票据过期: 返回 [`ScopeError::StaleLoad`], 结果被丢弃, 当前状态不变
    /// - 解码失败: 会话保持为空, 错误原样返回
    pub fn commit(
        &mut self,
        ticket: LoadTicket,
        outcome: ScopeResult<StreamAnalysis>,
    ) -> ScopeResult<()> {
        if ticket.generation() != self.generation || !self.loading {
            warn!(
                "会话: 丢弃过期的加载结果, ticket={}, current={}",
                ticket.generation(),
                self.generation
            );
            return Err(ScopeError::StaleLoad {
                ticket: ticket.generation(),
                current: self.generation,
            });
        }
        self.loading = false;

        let analysis = outcome?;
        self.nalu_cursor = Cursor::new(analysis.records.len());
        self.frame_cursor = Cursor::new(analysis.frames.len());
        self.analysis = Some(analysis);
        Ok(())
    }

    /// 加载并分析整个码流
    pub async fn load<D: FrameDecoder>(
        &mut self,
        data: Bytes,
        decoder: &D,
        yield_every: usize,
    ) -> ScopeResult<()> {
        let ticket = self.begin_load();
        let outcome = analyze(data, decoder, yield_every).await;
        self.commit(ticket, outcome)
    }

    /// 清除当前文件, 使未完成的加载失效
    pub fn clear(&mut self) {
        self.reset();
        self.loading = false;
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.analysis = None;
        self.nalu_cursor = Cursor::default();
        self.frame_cursor = Cursor::default();
    }

    /// 是否有加载正在进行
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 当前文件的分析结果
    pub fn analysis(&self) -> Option<&StreamAnalysis> {
        self.analysis.as_ref()
    }

    /// NAL 单元序列, 未加载时为空
    pub fn records(&self) -> &[NaluRecord] {
        self.analysis
            .as_ref()
            .map(|a| a.records.as_slice())
            .unwrap_or_default()
    }

    /// 帧序列, 未加载时为空
    pub fn frames(&self) -> &[FrameInfo] {
        self.analysis
            .as_ref()
            .map(|a| a.frames.as_slice())
            .unwrap_or_default()
    }

    /// 帧类型统计快照, 未加载时为空统计
    pub fn statistics(&self) -> FrameTypeStatistics {
        self.analysis
            .as_ref()
            .map(|a| a.statistics)
            .unwrap_or_default()
    }

    /// NAL 单元游标
    pub fn nalu_cursor(&self) -> Cursor {
        self.nalu_cursor
    }

    /// 帧游标
    pub fn frame_cursor(&self) -> Cursor {
        self.frame_cursor
    }

    /// 游标所指的 NAL 单元
    pub fn current_nalu(&self) -> Option<&NaluRecord> {
        self.records().get(self.nalu_cursor.index())
    }

    /// 游标所指的帧
    pub fn current_frame(&self) -> Option<&FrameInfo> {
        self.frames().get(self.frame_cursor.index())
    }

    /// 下一个 NAL 单元, 已在末尾时不动
    pub fn next_nalu(&mut self) -> bool {
        self.nalu_cursor.forward()
    }

    /// 上一个 NAL 单元, 已在开头时不动
    pub fn previous_nalu(&mut self) -> bool {
        self.nalu_cursor.backward()
    }

    /// 选中指定 NAL 单元, 越界时夹到末尾
    pub fn select_nalu(&mut self, index: usize) {
        self.nalu_cursor.select(index);
    }

    /// 下一帧, 已在末尾时不动
    pub fn next_frame(&mut self) -> bool {
        self.frame_cursor.forward()
    }

    /// 上一帧, 已在开头时不动
    pub fn previous_frame(&mut self) -> bool {
        self.frame_cursor.backward()
    }

    /// 选中指定帧, 越界时夹到末尾
    pub fn select_frame(&mut self, index: usize) {
        self.frame_cursor.select(index);
    }
}
