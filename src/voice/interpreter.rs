//! 语音指令分类器
//!
//! 流式调用：同一句话的部分结果会以越来越长的前缀反复传入，
//! 每次调用相互独立，不保留状态。

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// 指令关键词，按优先级排列（先匹配者胜出）
pub const COMMAND_KEYWORDS: [&str; 3] = ["click", "hover", "release"];

/// 语音动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "transcript", rename_all = "snake_case")]
pub enum VoiceAction {
    Click,
    Hover,
    Release,
    /// 未识别，携带原始片段（仅用于展示诊断）
    Unrecognized(String),
}

impl VoiceAction {
    /// 获取动作的显示名称
    pub fn label(&self) -> &'static str {
        match self {
            VoiceAction::Click => "Click",
            VoiceAction::Hover => "Hover",
            VoiceAction::Release => "Release",
            VoiceAction::Unrecognized(_) => "Unrecognized",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, VoiceAction::Unrecognized(_))
    }
}

/// 分类转写片段
///
/// 调用方负责预先转为小写（见 [`prepare_transcript`]）
pub fn classify(transcript: &str) -> VoiceAction {
    if transcript.contains(COMMAND_KEYWORDS[0]) {
        VoiceAction::Click
    } else if transcript.contains(COMMAND_KEYWORDS[1]) {
        VoiceAction::Hover
    } else if transcript.contains(COMMAND_KEYWORDS[2]) {
        VoiceAction::Release
    } else {
        VoiceAction::Unrecognized(transcript.to_string())
    }
}

/// 转写预处理：NFC 归一化 + 空白折叠 + 小写
pub fn prepare_transcript(raw: &str) -> String {
    let nfc: String = raw.nfc().collect();

    // 多个连续空白 -> 单个空格
    let mut folded = String::with_capacity(nfc.len());
    let mut prev_whitespace = false;
    for ch in nfc.chars() {
        if ch.is_whitespace() {
            if !prev_whitespace {
                folded.push(' ');
                prev_whitespace = true;
            }
        } else {
            folded.push(ch);
            prev_whitespace = false;
        }
    }

    folded.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keywords() {
        assert_eq!(classify("click"), VoiceAction::Click);
        assert_eq!(classify("hover over it"), VoiceAction::Hover);
        assert_eq!(classify("now release"), VoiceAction::Release);
    }

    #[test]
    fn test_keyword_priority() {
        assert_eq!(classify("please click and hover"), VoiceAction::Click);
        // 优先级与出现位置无关
        assert_eq!(classify("hover then click"), VoiceAction::Click);
        assert_eq!(classify("release after hover"), VoiceAction::Hover);
    }

    #[test]
    fn test_containment_not_word_match() {
        assert_eq!(classify("double-clicked"), VoiceAction::Click);
        assert_eq!(classify("hovercraft"), VoiceAction::Hover);
    }

    #[test]
    fn test_unrecognized_carries_transcript() {
        assert_eq!(
            classify("scroll down"),
            VoiceAction::Unrecognized("scroll down".to_string())
        );
        assert_eq!(classify(""), VoiceAction::Unrecognized(String::new()));
        assert!(!classify("tap").is_recognized());
    }

    #[test]
    fn test_case_sensitive_without_preparation() {
        // 未转小写的输入不匹配
        assert!(!classify("CLICK").is_recognized());
        assert_eq!(classify(&prepare_transcript("CLICK")), VoiceAction::Click);
    }

    #[test]
    fn test_streaming_prefixes_are_independent() {
        let utterance = "please hover and then click";
        let mut actions = Vec::new();
        for end in 1..=utterance.len() {
            actions.push(classify(&utterance[..end]));
        }

        // 重复调用结果一致
        for end in 1..=utterance.len() {
            assert_eq!(classify(&utterance[..end]), actions[end - 1]);
        }
        assert_eq!(actions.last(), Some(&VoiceAction::Click));
        assert_eq!(classify("please ho"), VoiceAction::Unrecognized("please ho".into()));
        assert_eq!(classify("please hover"), VoiceAction::Hover);
    }

    #[test]
    fn test_prepare_transcript() {
        assert_eq!(prepare_transcript("  Please   CLICK\tnow "), "please click now");
        // NFC: e + 组合重音 -> é
        assert_eq!(prepare_transcript("Caf\u{0065}\u{0301}"), "caf\u{00e9}");
        assert_eq!(prepare_transcript(""), "");
    }

    #[test]
    fn test_serialize_action() {
        let json = serde_json::to_string(&VoiceAction::Unrecognized("wave".into())).unwrap();
        assert_eq!(json, r#"{"action":"unrecognized","transcript":"wave"}"#);
        let json = serde_json::to_string(&VoiceAction::Click).unwrap();
        assert_eq!(json, r#"{"action":"click"}"#);
    }
}
