//! 规范化规则
//!
//! 字形运算符 → 宏 的映射表

use std::collections::HashMap;

/// 运算符替换表
pub struct OperatorRules {
    map: HashMap<char, &'static str>,
}

impl OperatorRules {
    pub fn new() -> Self {
        let map = HashMap::from([
            // 乘除
            ('×', "\\times "),
            ('÷', "\\div "),
            // 正负号
            ('±', "\\pm "),
            ('∓', "\\mp "),
            // 点乘
            ('·', "\\cdot "),
        ]);

        Self { map }
    }

    /// 尝试映射字形运算符
    pub fn try_map(&self, glyph: char) -> Option<&'static str> {
        self.map.get(&glyph).copied()
    }

    /// 获取所有源字形
    #[cfg(test)]
    pub fn glyphs(&self) -> Vec<char> {
        self.map.keys().copied().collect()
    }

    #[cfg(test)]
    pub fn replacements(&self) -> Vec<&'static str> {
        self.map.values().copied().collect()
    }
}

impl Default for OperatorRules {
    fn default() -> Self {
        Self::new()
    }
}
