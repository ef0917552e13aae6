//! 公式转义
//!
//! 公式嵌入渲染器调用脚本的双引号字符串字面量中，而脚本又内联在 HTML 的
//! `<script>` 块里：
//! - 反斜杠加倍、双引号加反斜杠，否则会提前终止字符串
//! - 换行、回车与 U+2028 / U+2029 写成转义序列，否则字符串字面量不闭合
//! - `<` 写成 `\u003c`，公式中的 `</script>` 或 `<!--` 不会改变 HTML 解析

/// 转义公式
pub fn escape_formula(formula: &str) -> String {
    let mut escaped = String::with_capacity(formula.len() + formula.len() / 4);
    for ch in formula.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            '<' => escaped.push_str("\\u003c"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 反转义，为 [`escape_formula`] 的逆变换
///
/// 非法转义序列（孤立反斜杠、无效的 `\u`）原样保留
pub fn unescape_formula(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match decode_unit(&hex) {
                    Some(decoded) => {
                        result.push(decoded);
                        chars.nth(3);
                    }
                    None => result.push_str("\\u"),
                }
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// 解析 `\u` 之后的 4 位十六进制
fn decode_unit(hex: &str) -> Option<char> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_backslash_and_quote() {
        assert_eq!(escape_formula("\\frac{1}{2}"), "\\\\frac{1}{2}");
        assert_eq!(escape_formula("\"x\""), "\\\"x\\\"");
        assert_eq!(escape_formula("\\\""), "\\\\\\\"");
        assert_eq!(escape_formula("7+8"), "7+8");
    }

    #[test]
    fn test_escaped_has_no_bare_quote() {
        let escaped = escape_formula("a\"); alert(1); (\"");
        // 每个双引号前都有奇数个反斜杠
        let chars: Vec<char> = escaped.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            if c == '"' {
                let backslashes = chars[..i].iter().rev().take_while(|&&b| b == '\\').count();
                assert_eq!(backslashes % 2, 1, "位置 {} 的双引号未转义", i);
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "7+8\\times ",
            "\\matrix{a & b \\\\ c & d}",
            "\"\"\\\\\"",
            "\\",
            "trailing\\",
            "α÷β \"q\"",
            "\\\\\\",
            "a\nb\r\nc",
            "x\u{2028}y\u{2029}z",
            "x</script><script>alert(1)</script>",
            "a<!--b",
            "\\nabla \\rho \\u",
            "1 < 2",
        ];
        for s in samples {
            assert_eq!(unescape_formula(&escape_formula(s)), s, "输入 {:?}", s);
        }
    }

    #[test]
    fn test_unescape_tolerates_lone_backslash() {
        assert_eq!(unescape_formula("a\\b"), "a\\b");
        assert_eq!(unescape_formula("end\\"), "end\\");
        assert_eq!(unescape_formula("\\uzz"), "\\uzz");
        assert_eq!(unescape_formula("\\u12"), "\\u12");
    }

    #[test]
    fn test_line_terminators_are_escaped() {
        let escaped = escape_formula("a\nb\rc\u{2028}d\u{2029}e");
        assert_eq!(escaped, "a\\nb\\rc\\u2028d\\u2029e");
        assert!(!escaped.contains(['\n', '\r', '\u{2028}', '\u{2029}']));
    }

    #[test]
    fn test_markup_cannot_close_script_block() {
        let escaped = escape_formula("x</script><!--");
        assert_eq!(escaped, "x\\u003c/script>\\u003c!--");
        assert!(!escaped.contains('<'));
    }
}
