// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::atomic_file::replace_file;

const APP_DIR_NAME: &str = "FormulaKeypad";
const CONFIG_FILENAME: &str = "config.json";

// ============================================================================
// 全局配置操作锁
// ============================================================================

lazy_static::lazy_static! {
    /// 全局配置操作锁
    ///
    /// 保护所有 config 的读写操作，防止并发 load->modify->save 导致的数据丢失
    ///
    /// 使用方式：
    /// ```ignore
    /// let _guard = CONFIG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    /// let (mut config, _) = AppConfig::load()?;
    /// // 修改 config...
    /// config.save()?;
    /// ```
    pub static ref CONFIG_LOCK: Mutex<()> = Mutex::new(());
}

// ============================================================================
// 渲染配置
// ============================================================================

/// 渲染配置
///
/// 渲染器始终以不抛错模式调用（`throwOnError: false`），不提供开关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// 是否使用块级公式模式
    #[serde(default = "default_display_mode")]
    pub display_mode: bool,
    /// 是否启用 KaTeX 严格模式
    #[serde(default)]
    pub strict: bool,
    /// KaTeX 样式表地址
    #[serde(default = "default_stylesheet_url")]
    pub stylesheet_url: String,
    /// KaTeX 脚本地址
    #[serde(default = "default_script_url")]
    pub script_url: String,
    /// 公式字号（em）
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    /// 单次渲染超时（毫秒）
    #[serde(default = "default_render_timeout_ms")]
    pub timeout_ms: u64,
    /// HTML 输出目录（为空时使用配置目录下的 render/）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

fn default_display_mode() -> bool {
    true
}

fn default_stylesheet_url() -> String {
    "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css".to_string()
}

fn default_script_url() -> String {
    "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js".to_string()
}

fn default_font_scale() -> f32 {
    1.5
}

fn default_render_timeout_ms() -> u64 {
    3000
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_mode: default_display_mode(),
            strict: false,
            stylesheet_url: default_stylesheet_url(),
            script_url: default_script_url(),
            font_scale: default_font_scale(),
            timeout_ms: default_render_timeout_ms(),
            output_dir: None,
        }
    }
}

impl RenderConfig {
    /// 验证渲染配置
    pub fn validate(&self) -> Result<()> {
        if self.stylesheet_url.trim().is_empty() || self.script_url.trim().is_empty() {
            anyhow::bail!("KaTeX 资源地址不能为空");
        }

        if !self.font_scale.is_finite() || self.font_scale <= 0.0 {
            anyhow::bail!("公式字号必须为正数: {}", self.font_scale);
        }

        if self.timeout_ms == 0 {
            anyhow::bail!("渲染超时必须大于 0");
        }

        Ok(())
    }

    /// 解析 HTML 输出目录（不存在时创建）
    pub fn resolve_output_dir(&self) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => app_dir()?.join("render"),
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

// ============================================================================
// 语音控制配置
// ============================================================================

/// 语音控制配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// 是否允许启动语音控制（默认启用）
    #[serde(default = "default_voice_enabled")]
    pub enabled: bool,
    /// 识别语言（仅传给语音源，指令关键词固定为英文）
    #[serde(default = "default_voice_locale")]
    pub locale: String,
    /// 启动时输出使用说明
    #[serde(default = "default_show_help_on_start")]
    pub show_help_on_start: bool,
}

fn default_voice_enabled() -> bool {
    true
}

fn default_voice_locale() -> String {
    "en-US".to_string()
}

fn default_show_help_on_start() -> bool {
    true
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_voice_enabled(),
            locale: default_voice_locale(),
            show_help_on_start: default_show_help_on_start(),
        }
    }
}

// ============================================================================
// 编辑器配置
// ============================================================================

/// 编辑器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// 点击定位时预估的字符宽度
    #[serde(default = "default_char_width")]
    pub char_width: f32,
    /// 每次内容变化时自动发起渲染
    #[serde(default = "default_render_on_change")]
    pub render_on_change: bool,
}

fn default_char_width() -> f32 {
    10.0
}

fn default_render_on_change() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            char_width: default_char_width(),
            render_on_change: default_render_on_change(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.char_width.is_finite() || self.char_width <= 0.0 {
            anyhow::bail!("字符宽度必须为正数: {}", self.char_width);
        }
        Ok(())
    }
}

// ============================================================================
// 应用配置
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

fn app_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法获取配置目录"))?;
    let app_dir = config_dir.join(APP_DIR_NAME);
    std::fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(app_dir()?.join(CONFIG_FILENAME))
    }

    /// 验证全部配置
    pub fn validate(&self) -> Result<()> {
        self.render
            .validate()
            .map_err(|e| anyhow::anyhow!("渲染配置无效: {}", e))?;
        self.editor
            .validate()
            .map_err(|e| anyhow::anyhow!("编辑器配置无效: {}", e))?;
        Ok(())
    }

    /// 加载配置
    ///
    /// 返回 (配置, 是否需要写回)。配置文件不存在时返回默认配置并要求写回。
    pub fn load() -> Result<(Self, bool)> {
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    pub(crate) fn load_from_path(path: &Path) -> Result<(Self, bool)> {
        tracing::info!("尝试从以下路径加载配置: {:?}", path);

        if !path.exists() {
            tracing::warn!("配置文件不存在，使用默认配置");
            return Ok((Self::new(), true));
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                // 不覆盖用户文件，仅本次使用默认值
                tracing::warn!("解析配置失败，使用默认配置: {}", e);
                return Ok((Self::new(), false));
            }
        };

        if let Err(e) = config.validate() {
            tracing::warn!("配置校验失败，使用默认配置: {}", e);
            return Ok((Self::new(), false));
        }

        tracing::info!("配置加载成功");
        Ok((config, false))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    pub(crate) fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tracing::info!("保存配置到: {:?}", path);

        replace_file(path, content.as_bytes())?;
        tracing::info!("配置保存成功");
        Ok(())
    }
}
