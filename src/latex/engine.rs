//! 规范化引擎

use std::time::Instant;

use crate::latex::rules::OperatorRules;
use crate::latex::types::{NormalizationResult, Substitution};

lazy_static::lazy_static! {
    /// 默认规范化器（规则表只构建一次）
    static ref DEFAULT_NORMALIZER: FormulaNormalizer = FormulaNormalizer::new();
}

/// 规范化原始公式
///
/// 纯函数，不可失败
pub fn normalize(raw: &str) -> String {
    DEFAULT_NORMALIZER.normalize(raw).text
}

/// 公式规范化器（可复用，预编译规则）
pub struct FormulaNormalizer {
    rules: OperatorRules,
}

impl FormulaNormalizer {
    pub fn new() -> Self {
        Self {
            rules: OperatorRules::new(),
        }
    }

    /// 规范化文本，附带替换记录
    pub fn normalize(&self, raw: &str) -> NormalizationResult {
        let start = Instant::now();

        if raw.is_empty() {
            return NormalizationResult::unchanged(String::new(), 0);
        }

        let mut text = String::with_capacity(raw.len());
        let mut applied = Vec::new();

        for (index, ch) in raw.chars().enumerate() {
            match self.rules.try_map(ch) {
                Some(replacement) => {
                    text.push_str(replacement);
                    applied.push(Substitution {
                        glyph: ch,
                        replaced: replacement.to_string(),
                        index,
                    });
                }
                None => text.push(ch),
            }
        }

        let elapsed_us = start.elapsed().as_micros() as u64;
        if applied.is_empty() {
            return NormalizationResult::unchanged(text, elapsed_us);
        }

        NormalizationResult {
            text,
            changed: true,
            applied,
            elapsed_us,
        }
    }
}

impl Default for FormulaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
