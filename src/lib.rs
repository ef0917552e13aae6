mod atomic_file;
pub mod buffer;
pub mod config;
pub mod latex;
pub mod pipeline;
pub mod render;
pub mod symbols;
pub mod voice;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use config::{AppConfig, CONFIG_LOCK};
use pipeline::{FormulaEditor, HostCommand};
use render::{HtmlFileSurface, RenderBridge, RenderDisplay, RenderOptions, RenderSurface};
use symbols::{palette, Category};
use voice::{ChannelTranscriptSource, InputMode, InputSession, Transcript, VoiceEvent};

/// 加载配置，首次运行时写回默认配置
fn load_config() -> Result<AppConfig> {
    let _guard = CONFIG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let (config, needs_save) = AppConfig::load()?;

    if needs_save {
        if let Err(e) = config.save() {
            tracing::warn!("写入默认配置失败: {}", e);
        }
    }

    Ok(config)
}

/// 交互式宿主
///
/// 从标准输入逐行读取命令，驱动编辑器与语音会话；渲染结果与语音事件
/// 由后台任务输出到标准输出
pub async fn run() -> Result<()> {
    let config = load_config()?;

    let output_dir = config.render.resolve_output_dir()?;
    let surface = HtmlFileSurface::new(&output_dir, config.render.clone());
    tracing::info!("渲染页输出: {:?}", surface.output_path());

    let bridge = Arc::new(RenderBridge::new(
        surface,
        RenderOptions::from(&config.render),
        Duration::from_millis(config.render.timeout_ms),
    ));
    let render_task = spawn_outcome_printer(&*bridge);

    let mut editor = FormulaEditor::new(Arc::clone(&bridge), config.editor.clone());

    let source = ChannelTranscriptSource::new();
    let mut session = InputSession::new(Arc::new(source.clone()), config.voice.clone());
    let mut voice_task: Option<JoinHandle<()>> = None;

    println!("=== Formula Keypad ===");
    println!("输入公式文本直接插入，:help 查看命令，:quit 退出\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match HostCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("✗ {}", e);
                continue;
            }
        };

        match command {
            HostCommand::Edit(edit) => match editor.apply(edit) {
                Ok(()) => print_buffer(&editor),
                Err(e) => println!("✗ {}", e),
            },
            HostCommand::Show => print_status(&editor),
            HostCommand::Export => println!("{}", editor.export()),
            HostCommand::Help => print_help(),
            HostCommand::VoiceStart => match session.start(InputMode::Voice) {
                Ok(events) => {
                    if let Some(task) = voice_task.take() {
                        task.abort();
                    }
                    voice_task = Some(spawn_voice_printer(events));
                    println!("✓ {} 已开启（~文本 推送转写，~!文本 推送最终结果）", InputMode::Voice.display_name());
                }
                Err(e) => println!("✗ {}", e),
            },
            HostCommand::VoiceStop => {
                session.stop();
                if let Some(task) = voice_task.take() {
                    task.abort();
                }
                println!("✓ 语音控制已关闭");
            }
            HostCommand::Transcript { text, is_final } => {
                let transcript = if is_final {
                    Transcript::final_result(text)
                } else {
                    Transcript::partial(text)
                };
                if let Err(e) = source.push(transcript) {
                    println!("✗ {}", e);
                }
            }
            HostCommand::Quit => break,
        }
    }

    session.stop();
    if let Some(task) = voice_task.take() {
        task.abort();
    }
    render_task.abort();

    println!("最终公式: {}", editor.export());
    Ok(())
}

fn spawn_outcome_printer<S: RenderSurface>(bridge: &RenderBridge<S>) -> JoinHandle<()> {
    let mut outcomes = bridge.subscribe();
    tokio::spawn(async move {
        while outcomes.changed().await.is_ok() {
            let outcome = outcomes.borrow_and_update().clone();
            match &outcome.display {
                RenderDisplay::Empty => {}
                RenderDisplay::Rendered(markup) => {
                    println!("  [render #{}] {} → {}", outcome.seq, outcome.formula, markup)
                }
                RenderDisplay::Failed(marker) => {
                    println!("  [render #{}] {}", outcome.seq, marker)
                }
            }
        }
    })
}

fn spawn_voice_printer(mut events: mpsc::Receiver<VoiceEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let marker = if event.is_final { "final" } else { "partial" };
            if event.action.is_recognized() {
                println!("  [voice {}] {} ({})", marker, event.action.label(), event.transcript);
            } else {
                println!("  [voice {}] 未识别: {}", marker, event.transcript);
            }
        }
    })
}

fn print_buffer<S: RenderSurface>(editor: &FormulaEditor<S>) {
    let buffer = editor.buffer();
    println!("{}│{}  (光标 {}/{})", buffer.before_cursor(), buffer.after_cursor(), buffer.cursor(), buffer.len());
}

fn print_status<S: RenderSurface>(editor: &FormulaEditor<S>) {
    print_buffer(editor);

    let normalized = editor.normalized();
    println!("规范化: {}", normalized.text);
    for substitution in &normalized.applied {
        println!("  #{} {} → {}", substitution.index, substitution.glyph, substitution.replaced);
    }

    let latest = editor.bridge().latest();
    match latest.display {
        RenderDisplay::Empty => println!("渲染: (尚未渲染)"),
        RenderDisplay::Rendered(markup) => println!("渲染 #{}: {}", latest.seq, markup),
        RenderDisplay::Failed(marker) => println!("渲染 #{}: {}", latest.seq, marker),
    }
}

fn print_help() {
    println!("命令:");
    println!("  <文本>              在光标处插入（::文本 插入以冒号开头的文本）");
    println!("  :left :right        光标左 / 右移");
    println!("  :home :end          光标移到开头 / 结尾");
    println!("  :pos N  :tap X      设置光标 / 按点击坐标定位");
    println!("  :del :clear         退格 / 清空");
    println!("  :sym 分类 名称       插入符号（:sym π 按字形查找）");
    println!("  :key 行 列           数字键盘");
    println!("  :macro 序号          公式宏键盘");
    println!("  :show :export       显示状态 / 输出规范化公式");
    println!("  :voice [off]        开启 / 关闭语音控制");
    println!("  :quit               退出");

    println!("\n数字键盘:");
    for (row, keys) in palette::NUMBER_PAD.iter().enumerate() {
        println!("  {}: {}", row, keys.join("  "));
    }

    println!("\n公式键盘:");
    for (index, key) in palette::FORMULA_KEYS.iter().enumerate() {
        let end = if (index + 1) % palette::FORMULA_COLUMNS == 0 { "\n" } else { "" };
        print!("  {:>2}: {:<24}{}", index, key, end);
    }

    println!("\n符号:");
    for category in Category::PICKER_ORDER {
        let entries: Vec<String> = symbols::list_category(category)
            .iter()
            .map(|s| format!("{}={}", s.name, s.glyph))
            .collect();
        println!("  {} ({}): {}", category.display_name(), category.key(), entries.join(" "));
    }

    println!("\n{}", voice::help_text());
}
