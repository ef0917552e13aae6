//! 键盘布局
//!
//! 数字键盘（4x4）与公式宏键盘。每个键对应一次原子插入。

/// 数字键盘，按行排列
pub const NUMBER_PAD: [[&str; 4]; 4] = [
    ["1", "2", "3", "+"],
    ["4", "5", "6", "-"],
    ["7", "8", "9", "×"],
    ["0", ".", "÷", "="],
];

/// 公式宏键盘（网格为 3 列）
pub const FORMULA_KEYS: [&str; 15] = [
    "\\frac{}{}",
    "\\sqrt{}",
    "\\pi",
    "\\sum_{i=1}^n",
    "\\int_{a}^{b}",
    "x^{}",
    "\\log",
    "\\ln",
    "\\lim_{x \\to \\infty}",
    "\\infty",
    "\\leq",
    "\\geq",
    "\\neq",
    "\\pm",
    "\\matrix{a & b \\\\ c & d}",
];

/// 公式宏键盘列数
pub const FORMULA_COLUMNS: usize = 3;

/// 获取数字键盘上的键（越界返回 None）
pub fn number_pad_key(row: usize, col: usize) -> Option<&'static str> {
    NUMBER_PAD.get(row).and_then(|r| r.get(col)).copied()
}

/// 获取公式宏键盘上的键（按线性序号）
pub fn formula_key(index: usize) -> Option<&'static str> {
    FORMULA_KEYS.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_pad_lookup() {
        assert_eq!(number_pad_key(0, 0), Some("1"));
        assert_eq!(number_pad_key(2, 3), Some("×"));
        assert_eq!(number_pad_key(3, 2), Some("÷"));
        assert_eq!(number_pad_key(4, 0), None);
        assert_eq!(number_pad_key(0, 4), None);
    }

    #[test]
    fn test_formula_keys() {
        assert_eq!(formula_key(0), Some("\\frac{}{}"));
        assert_eq!(formula_key(0).map(|k| k.chars().count()), Some(9));
        assert_eq!(formula_key(14), Some("\\matrix{a & b \\\\ c & d}"));
        assert_eq!(formula_key(15), None);
        assert_eq!(FORMULA_KEYS.len() % FORMULA_COLUMNS, 0);
    }
}
