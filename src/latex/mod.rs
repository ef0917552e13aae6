//! 公式规范化层
//!
//! 在缓冲区内容与渲染桥之间插入确定性替换规则。
//!
//! ## 处理流程
//! 1. 逐字符扫描原始内容
//! 2. 字形级二元运算符（× ÷ ± ∓ ·）替换为带尾随空格的宏
//! 3. 其余字符（包括已有的宏 token）原样保留
//!
//! 替换结果不含任何源字形，因此规范化是幂等的。

mod engine;
mod rules;
mod types;

pub use engine::{normalize, FormulaNormalizer};
pub use types::{NormalizationResult, Substitution};
