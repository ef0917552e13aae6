//! 符号库 - 静态数学符号目录
//!
//! 将常数、希腊字母、运算符、函数映射为 LaTeX 规范写法。
//!
//! ## 组成
//! - catalog: 分类目录（查找 / 按分类列举）
//! - palette: 数字键盘与公式宏键盘布局

mod catalog;
pub mod palette;

use serde::{Deserialize, Serialize};

pub use catalog::{find_by_glyph, list_category, lookup};

/// 符号（显示字形 + 规范 token）
///
/// 进程级静态数据，不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// 查找名（如 "alpha"）
    pub name: &'static str,
    /// 显示字形（如 "α"）
    pub glyph: &'static str,
    /// 插入缓冲区的 LaTeX token（如 "\alpha"）
    pub token: &'static str,
}

impl Symbol {
    pub const fn new(name: &'static str, glyph: &'static str, token: &'static str) -> Self {
        Self { name, glyph, token }
    }
}

/// 符号分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 数学常数
    Constants,
    /// 小写希腊字母
    GreekLower,
    /// 大写希腊字母
    GreekUpper,
    /// 运算符
    Operators,
    /// 数学函数
    Functions,
}

impl Category {
    /// 声明顺序
    pub const ALL: [Category; 5] = [
        Category::Constants,
        Category::GreekLower,
        Category::GreekUpper,
        Category::Operators,
        Category::Functions,
    ];

    /// 符号选择器中的分区顺序
    pub const PICKER_ORDER: [Category; 5] = [
        Category::Operators,
        Category::Constants,
        Category::Functions,
        Category::GreekLower,
        Category::GreekUpper,
    ];

    /// 获取分类的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Constants => "Constants",
            Category::GreekLower => "Greek Lowercase",
            Category::GreekUpper => "Greek Uppercase",
            Category::Operators => "Operators",
            Category::Functions => "Functions",
        }
    }

    /// 命令行中使用的名称
    pub fn key(&self) -> &'static str {
        match self {
            Category::Constants => "constants",
            Category::GreekLower => "greek_lower",
            Category::GreekUpper => "greek_upper",
            Category::Operators => "operators",
            Category::Functions => "functions",
        }
    }

    /// 从名称解析分类
    ///
    /// 接受 snake_case 名称、显示名称以及常用简写，大小写不敏感
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "constants" | "constant" | "const" => Some(Category::Constants),
            "greek_lower" | "greek_lowercase" | "greek" => Some(Category::GreekLower),
            "greek_upper" | "greek_uppercase" | "greek_cap" => Some(Category::GreekUpper),
            "operators" | "operator" | "op" | "ops" => Some(Category::Operators),
            "functions" | "function" | "fn" | "func" => Some(Category::Functions),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_name() {
        assert_eq!(Category::from_name("greek_lower"), Some(Category::GreekLower));
        assert_eq!(
            Category::from_name("Greek Uppercase"),
            Some(Category::GreekUpper)
        );
        assert_eq!(Category::from_name("OPS"), Some(Category::Operators));
        assert_eq!(Category::from_name("matrices"), None);
    }

    #[test]
    fn test_display_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.display_name()), Some(category));
            assert_eq!(Category::from_name(category.key()), Some(category));
        }
    }
}
