// 输入会话
//
// 替代进程级单例：会话对象由宿主显式持有，生命周期为 start(mode) / stop()。
// 语音源以异步流提供部分转写结果，会话逐条分类并记录日志，
// 同时通过通道把结果发给订阅方（仅用于展示）。

use anyhow::Result;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::VoiceConfig;
use crate::voice::interpreter::{classify, prepare_transcript, VoiceAction};

/// 事件通道容量，满时丢弃（部分结果会被后续结果覆盖）
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// 语音控制
    #[default]
    Voice,
}

impl InputMode {
    /// 获取模式的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            InputMode::Voice => "Voice Control",
        }
    }
}

/// 转写片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    /// 是否为最终结果（最终结果之后识别任务结束）
    pub is_final: bool,
}

impl Transcript {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_result(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// 转写流，授权失败 / 引擎错误以 `Err` 项出现
pub type TranscriptStream = Pin<Box<dyn Stream<Item = Result<Transcript>> + Send>>;

/// 语音源
pub trait TranscriptSource: Send + Sync {
    /// 打开一次识别（每次 start 调用一次）
    fn open(&self) -> Result<TranscriptStream>;

    /// 会话停止时调用，释放本次识别占用的资源
    fn close(&self) {}
}

/// 分类结果事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceEvent {
    pub session_id: String,
    /// 预处理后的转写文本
    pub transcript: String,
    pub action: VoiceAction,
    pub is_final: bool,
}

/// 使用说明（会话启动时输出）
pub fn help_text() -> &'static str {
    "[Visual Input Help / 视觉输入提示]\n\
     ------------------------------------------\n\
     1. Voice Control (语音控制):\n\
     \x20  - Say \"click\", \"hover\" or \"release\" to simulate touch actions.\n\
     \x20  - 使用语音指令（如 \"click\"、\"hover\"、\"release\"）模拟触控操作。\n\
     2. Dwell Control (停留控制):\n\
     \x20  - Enable it in the system accessibility settings; a prolonged gaze simulates a tap.\n\
     \x20  - 请在系统辅助功能设置中开启，长时间注视即可模拟点击。"
}

/// 输入会话
pub struct InputSession {
    id: Uuid,
    source: Arc<dyn TranscriptSource>,
    config: VoiceConfig,
    mode: Option<InputMode>,
    task: Option<JoinHandle<()>>,
}

impl InputSession {
    pub fn new(source: Arc<dyn TranscriptSource>, config: VoiceConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            config,
            mode: None,
            task: None,
        }
    }

    pub fn session_id(&self) -> String {
        self.id.to_string()
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<InputMode> {
        self.mode
    }

    /// 识别任务是否仍在运行
    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// 启动会话
    ///
    /// 已激活时先停止旧的识别任务再重新开始。必须在 tokio 运行时内调用。
    pub fn start(&mut self, mode: InputMode) -> Result<mpsc::Receiver<VoiceEvent>> {
        if !self.config.enabled {
            anyhow::bail!("语音控制未启用");
        }

        if self.is_active() {
            tracing::info!("Voice [{}]: 会话已激活，重新启动", self.short_id());
            self.abort_task();
        }

        self.mode = Some(mode);
        tracing::info!(
            "Voice [{}]: {} 已激活 (locale={})",
            self.short_id(),
            mode.display_name(),
            self.config.locale
        );
        if self.config.show_help_on_start {
            tracing::info!("\n{}", help_text());
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        // 同步打开语音源：start 返回时即可接收转写片段
        let stream = match self.source.open() {
            Ok(stream) => stream,
            Err(e) => {
                // 授权失败：记录后不再输出，事件通道随 tx 释放而关闭
                tracing::error!("Voice [{}]: 语音识别启动失败: {}", self.short_id(), e);
                return Ok(rx);
            }
        };

        let session_id = self.session_id();
        self.task = Some(tokio::spawn(run_recognition(stream, session_id, tx)));

        Ok(rx)
    }

    /// 停止会话
    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }

        self.abort_task();
        self.source.close();
        self.mode = None;
        tracing::info!("Voice [{}]: 语音控制已停用", self.short_id());
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Voice [{}]: 识别任务已取消", self.short_id());
        }
    }

    fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

impl Drop for InputSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// 识别任务：消费转写流直到最终结果、错误或流结束
async fn run_recognition(
    mut stream: TranscriptStream,
    session_id: String,
    tx: mpsc::Sender<VoiceEvent>,
) {
    let short_id = session_id[..8].to_string();

    tracing::info!("Voice [{}]: 语音识别已开始", short_id);

    while let Some(item) = stream.next().await {
        let transcript = match item {
            Ok(t) => t,
            Err(e) => {
                // 授权 / 引擎错误：记录后停止输出，不重试
                tracing::error!("Voice [{}]: 语音识别出错，停止识别: {}", short_id, e);
                return;
            }
        };

        let prepared = prepare_transcript(&transcript.text);
        let action = classify(&prepared);
        match &action {
            VoiceAction::Unrecognized(text) => {
                tracing::info!("Voice [{}]: 未识别的指令 -> {}", short_id, text);
            }
            recognized => {
                tracing::info!("Voice [{}]: 检测到指令 {}", short_id, recognized.label());
            }
        }

        let event = VoiceEvent {
            session_id: session_id.clone(),
            transcript: prepared,
            action,
            is_final: transcript.is_final,
        };
        if let Err(e) = tx.try_send(event) {
            tracing::debug!("Voice [{}]: 事件未送达: {}", short_id, e);
        }

        if transcript.is_final {
            break;
        }
    }

    tracing::info!("Voice [{}]: 语音识别已结束", short_id);
}

// ============================================================================
// 通道语音源
// ============================================================================

type TranscriptSender = mpsc::Sender<Result<Transcript>>;

/// 由宿主推送转写片段的语音源
///
/// 每次 `open` 建立新通道，之前的通道随之失效
#[derive(Clone, Default)]
pub struct ChannelTranscriptSource {
    sender: Arc<Mutex<Option<TranscriptSender>>>,
}

impl ChannelTranscriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推送一个转写片段
    pub fn push(&self, transcript: Transcript) -> Result<()> {
        self.send(Ok(transcript))
    }

    /// 推送一个引擎错误
    pub fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.send(Err(anyhow::anyhow!(message.into())))
    }

    fn send(&self, item: Result<Transcript>) -> Result<()> {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            anyhow::bail!("语音识别未开始");
        };
        sender
            .try_send(item)
            .map_err(|e| anyhow::anyhow!("推送转写片段失败: {}", e))
    }
}

impl TranscriptSource for ChannelTranscriptSource {
    fn open(&self) -> Result<TranscriptStream> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        *self.sender.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }

    fn close(&self) {
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}
