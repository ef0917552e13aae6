// Pipeline 核心类型定义
//
// 定义了输入表面发往编辑器的命令，以及宿主命令行的解析：
// - 编辑命令 (EditCommand)
// - 宿主命令 (HostCommand)

use anyhow::Result;

use crate::symbols::Category;

/// 编辑命令
///
/// 每个命令对应一次缓冲区操作
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// 插入字面文本
    Insert(String),
    /// 插入符号库中的符号
    Symbol { category: Category, name: String },
    /// 按显示字形插入符号（如 "π"）
    Glyph(String),
    /// 数字键盘按键
    NumberKey { row: usize, col: usize },
    /// 公式宏键盘按键
    FormulaKey(usize),
    MoveLeft,
    MoveRight,
    Home,
    End,
    SetCursor(isize),
    /// 点击输入区，横向坐标
    Tap(f32),
    DeleteBackward,
    Clear,
}

/// 宿主命令
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Edit(EditCommand),
    /// 显示当前缓冲区与渲染状态
    Show,
    /// 导出规范化公式
    Export,
    /// 列出符号与键盘
    Help,
    VoiceStart,
    VoiceStop,
    /// 推送一个转写片段
    Transcript { text: String, is_final: bool },
    Quit,
}

impl HostCommand {
    /// 解析一行宿主输入
    ///
    /// - `~text` / `~!text`: 部分 / 最终转写片段
    /// - `::text`: 插入以冒号开头的字面文本
    /// - `:cmd args`: 命令
    /// - 其他: 字面插入
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() {
            return Ok(HostCommand::Show);
        }

        if let Some(rest) = line.strip_prefix("~!") {
            return Ok(HostCommand::Transcript {
                text: rest.trim().to_string(),
                is_final: true,
            });
        }
        if let Some(rest) = line.strip_prefix('~') {
            return Ok(HostCommand::Transcript {
                text: rest.trim().to_string(),
                is_final: false,
            });
        }

        if let Some(rest) = line.strip_prefix("::") {
            return Ok(HostCommand::Edit(EditCommand::Insert(format!(":{}", rest))));
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Ok(HostCommand::Edit(EditCommand::Insert(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match (name.as_str(), args.as_slice()) {
            ("left", []) => HostCommand::Edit(EditCommand::MoveLeft),
            ("right", []) => HostCommand::Edit(EditCommand::MoveRight),
            ("home", []) => HostCommand::Edit(EditCommand::Home),
            ("end", []) => HostCommand::Edit(EditCommand::End),
            ("del" | "delete" | "backspace", []) => HostCommand::Edit(EditCommand::DeleteBackward),
            ("clear", []) => HostCommand::Edit(EditCommand::Clear),
            ("pos", [p]) => HostCommand::Edit(EditCommand::SetCursor(parse_arg(p, "光标位置")?)),
            ("tap", [x]) => HostCommand::Edit(EditCommand::Tap(parse_arg(x, "点击坐标")?)),
            ("sym", [glyph]) => HostCommand::Edit(EditCommand::Glyph(glyph.to_string())),
            ("sym", [category, name]) => {
                let category = Category::from_name(category)
                    .ok_or_else(|| anyhow::anyhow!("未知的符号分类: {}", category))?;
                HostCommand::Edit(EditCommand::Symbol {
                    category,
                    name: name.to_string(),
                })
            }
            ("key", [row, col]) => HostCommand::Edit(EditCommand::NumberKey {
                row: parse_arg(row, "行号")?,
                col: parse_arg(col, "列号")?,
            }),
            ("macro", [index]) => HostCommand::Edit(EditCommand::FormulaKey(parse_arg(index, "宏序号")?)),
            ("show", []) => HostCommand::Show,
            ("export", []) => HostCommand::Export,
            ("help", []) => HostCommand::Help,
            ("voice", []) | ("voice", ["on"]) => HostCommand::VoiceStart,
            ("voice", ["off"]) => HostCommand::VoiceStop,
            ("quit" | "exit" | "q", []) => HostCommand::Quit,
            _ => anyhow::bail!("无法识别的命令: :{}", rest.trim()),
        };

        Ok(command)
    }
}

fn parse_arg<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| anyhow::anyhow!("{}无效: {}", what, raw))
}
