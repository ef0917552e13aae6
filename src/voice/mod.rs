//! 语音指令层
//!
//! - interpreter: 转写片段 → 离散动作（关键词包含匹配）
//! - session: 输入会话上下文（显式 start / stop 生命周期）
//!
//! 动作只用于记录和展示，不驱动缓冲区编辑。

mod interpreter;
mod session;

pub use interpreter::{classify, prepare_transcript, VoiceAction, COMMAND_KEYWORDS};
pub use session::{
    help_text, ChannelTranscriptSource, InputMode, InputSession, Transcript, TranscriptSource,
    TranscriptStream, VoiceEvent,
};
