//! 渲染请求
//!
//! 渲染器的唯一线上契约：转义后的公式字符串 + 调用参数。

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::render::escape::escape_formula;

/// 渲染目标元素 id
pub const FORMULA_ELEMENT_ID: &str = "formula";

/// 渲染器调用参数（序列化为 KaTeX options）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub display_mode: bool,
    /// 始终为 false：格式错误由渲染器就地显示
    pub throw_on_error: bool,
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            display_mode: true,
            throw_on_error: false,
            strict: false,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            display_mode: config.display_mode,
            throw_on_error: false,
            strict: config.strict,
        }
    }
}

/// 渲染请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    /// 序号，越大越新
    pub seq: u64,
    /// 规范化后的公式
    pub formula: String,
    /// 转义后的载荷
    pub escaped: String,
    pub options: RenderOptions,
}

/// 构建渲染请求（默认参数）
pub fn render(formula: &str) -> RenderRequest {
    RenderRequest::new(0, formula, RenderOptions::default())
}

impl RenderRequest {
    pub fn new(seq: u64, formula: &str, options: RenderOptions) -> Self {
        Self {
            seq,
            formula: formula.to_string(),
            escaped: escape_formula(formula),
            options,
        }
    }

    /// 生成渲染器调用脚本
    ///
    /// 渲染异常被捕获并以 `Error: <message>` 写入目标元素
    pub fn invocation_script(&self) -> String {
        let options = serde_json::to_string(&self.options).unwrap_or_else(|e| {
            tracing::warn!("Render: 序列化渲染参数失败，使用默认参数: {}", e);
            r#"{"displayMode":true,"throwOnError":false,"strict":false}"#.to_string()
        });

        format!(
            r#"try {{
    katex.render("{escaped}", document.getElementById('{id}'), {options});
}} catch (e) {{
    document.getElementById('{id}').innerHTML = 'Error: ' + e.message;
}}"#,
            escaped = self.escaped,
            id = FORMULA_ELEMENT_ID,
            options = options,
        )
    }

    /// 生成承载渲染器的完整 HTML 页面
    pub fn html_document(&self, config: &RenderConfig) -> String {
        let script = self
            .invocation_script()
            .lines()
            .map(|line| format!("            {}", line))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="{stylesheet}" crossorigin="anonymous">
    <script defer src="{script_url}" crossorigin="anonymous"></script>
    <style>
        body {{
            margin: 0;
            padding: 0;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            background-color: transparent;
        }}
        #{id} {{
            width: 100%;
            text-align: center;
        }}
        .katex {{
            font-size: {font_scale}em;
        }}
    </style>
</head>
<body>
    <div id="{id}"></div>
    <script>
        document.addEventListener('DOMContentLoaded', function() {{
{script}
        }});
    </script>
</body>
</html>
"#,
            stylesheet = config.stylesheet_url,
            script_url = config.script_url,
            id = FORMULA_ELEMENT_ID,
            font_scale = config.font_scale,
            script = script,
        )
    }
}
