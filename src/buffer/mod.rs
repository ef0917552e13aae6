//! 光标缓冲区
//!
//! 公式输入的可变状态：Unicode 标量序列 + 插入点光标。
//!
//! 所有操作都是全函数：越界的光标请求一律钳制到 `[0, len]`，不返回错误。
//! 内容或光标实际发生变化时，向订阅者广播一次 [`BufferChange`]。

use serde::Serialize;
use std::fmt;

/// 编辑类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Insert,
    Delete,
    Move,
    Clear,
}

/// 变更通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferChange {
    pub kind: EditKind,
    /// 变更后的完整内容
    pub content: String,
    /// 变更后的光标位置（字符索引）
    pub cursor: usize,
}

/// 订阅句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangeListener = Box<dyn FnMut(&BufferChange) + Send>;

/// 光标缓冲区
///
/// 不变式：`cursor <= content.len()`，每个操作返回前都重新满足
pub struct CursorBuffer {
    content: Vec<char>,
    cursor: usize,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl CursorBuffer {
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            cursor: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ========== 读取 ==========

    /// 当前内容
    pub fn content(&self) -> String {
        self.content.iter().collect()
    }

    /// 当前光标位置
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 内容长度（Unicode 标量数）
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// 光标之前的文本
    pub fn before_cursor(&self) -> String {
        self.content[..self.cursor].iter().collect()
    }

    /// 光标之后的文本
    pub fn after_cursor(&self) -> String {
        self.content[self.cursor..].iter().collect()
    }

    // ========== 编辑 ==========

    /// 在光标处插入文本
    ///
    /// 多字符宏（如 `\frac{}{}`）作为一次原子插入，光标移动到插入文本之后
    pub fn insert_at_cursor(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.content.splice(self.cursor..self.cursor, inserted);
        self.cursor += count;

        self.notify(EditKind::Insert);
    }

    /// 删除光标前的一个字符
    ///
    /// 光标在开头时不做任何事
    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }

        self.content.remove(self.cursor - 1);
        self.cursor -= 1;

        self.notify(EditKind::Delete);
    }

    /// 设置光标位置（钳制到 `[0, len]`）
    pub fn set_cursor_position(&mut self, position: isize) {
        let clamped = position.clamp(0, self.content.len() as isize) as usize;
        if clamped == self.cursor {
            return;
        }

        self.cursor = clamped;
        self.notify(EditKind::Move);
    }

    /// 相对移动光标，钳制规则与 [`set_cursor_position`](Self::set_cursor_position) 相同
    pub fn move_cursor(&mut self, offset: isize) {
        let target = (self.cursor as isize).saturating_add(offset);
        self.set_cursor_position(target);
    }

    /// 根据点击的横向坐标估算光标位置
    ///
    /// 按等宽字符估算：`floor(x / char_width)`。NaN 视为 0，无穷值钳制到两端
    pub fn set_cursor_from_offset(&mut self, x: f32, char_width: f32) {
        let estimated = (x / char_width).floor() as isize;
        self.set_cursor_position(estimated);
    }

    /// 清空内容，光标归零
    pub fn clear(&mut self) {
        if self.content.is_empty() && self.cursor == 0 {
            return;
        }

        self.content.clear();
        self.cursor = 0;
        self.notify(EditKind::Clear);
    }

    // ========== 变更通知 ==========

    /// 注册变更回调
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&BufferChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// 取消订阅，返回是否存在该订阅
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, kind: EditKind) {
        debug_assert!(self.cursor <= self.content.len());

        if self.listeners.is_empty() {
            return;
        }

        let change = BufferChange {
            kind,
            content: self.content(),
            cursor: self.cursor,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl Default for CursorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CursorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorBuffer")
            .field("content", &self.content())
            .field("cursor", &self.cursor)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
