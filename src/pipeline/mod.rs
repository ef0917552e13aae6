// Pipeline 模块 - 编辑管道
//
// 输入表面（键盘 / 符号选择 / 宿主命令行）→ 缓冲区 → 规范化 → 渲染桥

mod editor;
mod types;

pub use editor::FormulaEditor;
pub use types::{EditCommand, HostCommand};
