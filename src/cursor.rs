//! 序列游标.
//!
//! NAL 单元与解码帧各有一个游标. 游标始终落在 `[0, len-1]` 内,
//! 在边界处前进/后退为空操作, 不会回绕.

/// 有界游标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// 创建指向首个元素的游标
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// 当前位置
    pub fn index(&self) -> usize {
        self.index
    }

    /// 序列长度
    pub fn len(&self) -> usize {
        self.len
    }

    /// 序列是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 前进一步, 已在末尾时不动. 返回是否移动
    pub fn forward(&mut self) -> bool {
        if self.index + 1 < self.len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// 后退一步, 已在开头时不动. 返回是否移动
    pub fn backward(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// 跳转到指定位置, 越界时夹到末尾
    pub fn select(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }

    /// `当前/总数` 形式的计数文本, 空序列为 `0/0`
    pub fn counter(&self) -> String {
        if self.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.index + 1, self.len)
    }
}
