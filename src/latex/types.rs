//! 规范化类型定义

use serde::{Deserialize, Serialize};

/// 替换记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// 原始字形
    pub glyph: char,
    /// 替换后的宏
    pub replaced: String,
    /// 在原文中的位置（字符索引）
    pub index: usize,
}

/// 规范化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationResult {
    /// 规范化后的文本
    pub text: String,
    /// 是否有改动
    pub changed: bool,
    /// 替换记录
    pub applied: Vec<Substitution>,
    /// 处理耗时（微秒）
    pub elapsed_us: u64,
}

impl NormalizationResult {
    /// 创建无修改的结果
    pub fn unchanged(text: String, elapsed_us: u64) -> Self {
        Self {
            text,
            changed: false,
            applied: Vec::new(),
            elapsed_us,
        }
    }
}
