// 公式编辑器
//
// 串联 缓冲区 → 规范化 → 渲染桥。
// 输入表面的每个命令都作用于缓冲区；缓冲区变化时把规范化后的内容
// 提交给渲染桥（不等待结果）。

use anyhow::Result;
use std::sync::Arc;

use crate::buffer::{BufferChange, CursorBuffer, EditKind, SubscriptionId};
use crate::config::EditorConfig;
use crate::latex::{normalize, FormulaNormalizer, NormalizationResult};
use crate::pipeline::types::EditCommand;
use crate::render::{RenderBridge, RenderSurface};
use crate::symbols::{self, palette};

/// 公式编辑器
pub struct FormulaEditor<S: RenderSurface> {
    buffer: CursorBuffer,
    bridge: Arc<RenderBridge<S>>,
    normalizer: FormulaNormalizer,
    config: EditorConfig,
}

impl<S: RenderSurface> FormulaEditor<S> {
    /// 创建编辑器
    ///
    /// `render_on_change` 开启时，缓冲区的每次有效变化都会提交一次渲染
    pub fn new(bridge: Arc<RenderBridge<S>>, config: EditorConfig) -> Self {
        let mut buffer = CursorBuffer::new();

        if config.render_on_change {
            let bridge = Arc::clone(&bridge);
            buffer.subscribe(move |change: &BufferChange| {
                // 仅移动光标不改变公式，不必重新渲染
                if change.kind == EditKind::Move {
                    return;
                }
                let formula = normalize(&change.content);
                let seq = bridge.submit(&formula);
                tracing::debug!(
                    "Editor: 内容变化 ({:?})，提交渲染 seq={} len={}",
                    change.kind,
                    seq,
                    formula.len()
                );
            });
        }

        Self {
            buffer,
            bridge,
            normalizer: FormulaNormalizer::new(),
            config,
        }
    }

    /// 执行一条编辑命令
    ///
    /// 查找失败（未知符号 / 越界按键）时返回错误，缓冲区保持不变
    pub fn apply(&mut self, command: EditCommand) -> Result<()> {
        tracing::debug!("Editor: 执行命令 {:?}", command);

        match command {
            EditCommand::Insert(text) => self.buffer.insert_at_cursor(&text),
            EditCommand::Symbol { category, name } => {
                let symbol = symbols::lookup(category, &name).ok_or_else(|| {
                    anyhow::anyhow!("未找到符号: {} / {}", category.display_name(), name)
                })?;
                self.buffer.insert_at_cursor(symbol.token);
            }
            EditCommand::Glyph(glyph) => {
                let (category, symbol) = symbols::find_by_glyph(&glyph)
                    .ok_or_else(|| anyhow::anyhow!("未找到字形对应的符号: {}", glyph))?;
                tracing::debug!(
                    "Editor: 字形 {} → {} ({})",
                    glyph,
                    symbol.token,
                    category.display_name()
                );
                self.buffer.insert_at_cursor(symbol.token);
            }
            EditCommand::NumberKey { row, col } => {
                let key = palette::number_pad_key(row, col)
                    .ok_or_else(|| anyhow::anyhow!("数字键盘没有按键 ({}, {})", row, col))?;
                self.buffer.insert_at_cursor(key);
            }
            EditCommand::FormulaKey(index) => {
                let key = palette::formula_key(index)
                    .ok_or_else(|| anyhow::anyhow!("公式键盘没有第 {} 个按键", index))?;
                self.buffer.insert_at_cursor(key);
            }
            EditCommand::MoveLeft => self.buffer.move_cursor(-1),
            EditCommand::MoveRight => self.buffer.move_cursor(1),
            EditCommand::Home => self.buffer.set_cursor_position(0),
            EditCommand::End => {
                let end = self.buffer.len() as isize;
                self.buffer.set_cursor_position(end);
            }
            EditCommand::SetCursor(position) => self.buffer.set_cursor_position(position),
            EditCommand::Tap(x) => self
                .buffer
                .set_cursor_from_offset(x, self.config.char_width),
            EditCommand::DeleteBackward => self.buffer.delete_backward(),
            EditCommand::Clear => self.buffer.clear(),
        }

        Ok(())
    }

    pub fn buffer(&self) -> &CursorBuffer {
        &self.buffer
    }

    /// 订阅缓冲区变化（界面刷新用）
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&BufferChange) + Send + 'static,
    {
        self.buffer.subscribe(listener)
    }

    /// 规范化当前内容，附带替换记录
    pub fn normalized(&self) -> NormalizationResult {
        self.normalizer.normalize(&self.buffer.content())
    }

    /// 导出规范化后的公式
    pub fn export(&self) -> String {
        self.normalized().text
    }

    /// 立即提交一次渲染，返回请求序号
    pub fn render_now(&self) -> u64 {
        self.bridge.submit(&self.export())
    }

    pub fn bridge(&self) -> &Arc<RenderBridge<S>> {
        &self.bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderDisplay, RenderOptions, RenderOutcome, RenderRequest};
    use crate::symbols::Category;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::watch;

    /// 记录收到的公式
    #[derive(Clone, Default)]
    struct RecordingSurface {
        formulas: Arc<Mutex<Vec<String>>>,
    }

    impl RenderSurface for RecordingSurface {
        async fn render(&self, request: &RenderRequest) -> Result<String> {
            self.formulas.lock().unwrap().push(request.formula.clone());
            Ok(format!("<span>{}</span>", request.escaped))
        }
    }

    fn editor(config: EditorConfig) -> (FormulaEditor<RecordingSurface>, RecordingSurface) {
        let surface = RecordingSurface::default();
        let bridge = Arc::new(RenderBridge::new(
            surface.clone(),
            RenderOptions::default(),
            Duration::from_secs(1),
        ));
        (FormulaEditor::new(bridge, config), surface)
    }

    async fn wait_for_seq(rx: &mut watch::Receiver<RenderOutcome>, seq: u64) -> RenderOutcome {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|o| o.seq >= seq))
            .await
            .expect("等待渲染超时")
            .expect("渲染通道已关闭")
            .clone()
    }

    #[tokio::test]
    async fn test_keypad_sequence_renders_normalized_formula() {
        let (mut editor, _) = editor(EditorConfig::default());
        let mut rx = editor.bridge().subscribe();

        editor.apply(EditCommand::NumberKey { row: 2, col: 0 }).unwrap(); // 7
        editor.apply(EditCommand::Insert("+".into())).unwrap();
        editor.apply(EditCommand::NumberKey { row: 2, col: 1 }).unwrap(); // 8
        editor.apply(EditCommand::Insert("×".into())).unwrap();

        assert_eq!(editor.buffer().content(), "7+8×");
        assert_eq!(editor.buffer().cursor(), 4);
        assert_eq!(editor.export(), "7+8\\times ");

        let seq = editor.render_now();
        let outcome = wait_for_seq(&mut rx, seq).await;
        assert_eq!(outcome.formula, "7+8\\times ");
        assert_eq!(
            outcome.display,
            RenderDisplay::Rendered("<span>7+8\\\\times </span>".into())
        );
    }

    #[tokio::test]
    async fn test_formula_key_places_cursor_after_token() {
        let (mut editor, _) = editor(EditorConfig::default());

        editor.apply(EditCommand::FormulaKey(0)).unwrap();
        assert_eq!(editor.buffer().content(), "\\frac{}{}");
        assert_eq!(editor.buffer().cursor(), 9);
    }

    #[tokio::test]
    async fn test_symbol_and_glyph_lookup() {
        let (mut editor, _) = editor(EditorConfig::default());

        editor
            .apply(EditCommand::Symbol {
                category: Category::GreekLower,
                name: "alpha".into(),
            })
            .unwrap();
        editor.apply(EditCommand::Glyph("π".into())).unwrap();
        assert_eq!(editor.buffer().content(), "\\alpha\\pi");
    }

    #[tokio::test]
    async fn test_lookup_failure_leaves_buffer_untouched() {
        let (mut editor, _) = editor(EditorConfig::default());
        editor.apply(EditCommand::Insert("x".into())).unwrap();

        assert!(editor
            .apply(EditCommand::Symbol {
                category: Category::Operators,
                name: "nope".into(),
            })
            .is_err());
        assert!(editor.apply(EditCommand::Glyph("☃".into())).is_err());
        assert!(editor.apply(EditCommand::NumberKey { row: 4, col: 0 }).is_err());
        assert!(editor.apply(EditCommand::FormulaKey(15)).is_err());

        assert_eq!(editor.buffer().content(), "x");
        assert_eq!(editor.buffer().cursor(), 1);
    }

    #[tokio::test]
    async fn test_cursor_commands() {
        let (mut editor, _) = editor(EditorConfig::default());
        editor.apply(EditCommand::Insert("abc".into())).unwrap();

        editor.apply(EditCommand::Home).unwrap();
        assert_eq!(editor.buffer().cursor(), 0);
        editor.apply(EditCommand::MoveLeft).unwrap();
        assert_eq!(editor.buffer().cursor(), 0);
        editor.apply(EditCommand::MoveRight).unwrap();
        assert_eq!(editor.buffer().cursor(), 1);
        editor.apply(EditCommand::End).unwrap();
        assert_eq!(editor.buffer().cursor(), 3);
        editor.apply(EditCommand::SetCursor(-5)).unwrap();
        assert_eq!(editor.buffer().cursor(), 0);
        editor.apply(EditCommand::SetCursor(99)).unwrap();
        assert_eq!(editor.buffer().cursor(), 3);

        // 默认字符宽度 10
        editor.apply(EditCommand::Tap(25.0)).unwrap();
        assert_eq!(editor.buffer().cursor(), 2);

        editor.apply(EditCommand::DeleteBackward).unwrap();
        assert_eq!(editor.buffer().content(), "ac");
        assert_eq!(editor.buffer().cursor(), 1);

        editor.apply(EditCommand::Clear).unwrap();
        assert!(editor.buffer().is_empty());
        assert_eq!(editor.buffer().cursor(), 0);
    }

    #[tokio::test]
    async fn test_render_on_change_submits_latest_content() {
        let (mut editor, _) = editor(EditorConfig::default());
        let mut rx = editor.bridge().subscribe();

        editor.apply(EditCommand::Insert("1".into())).unwrap();
        editor.apply(EditCommand::Insert("÷".into())).unwrap();
        editor.apply(EditCommand::Insert("2".into())).unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|o| o.formula == "1\\div 2"),
        )
        .await
        .expect("等待渲染超时")
        .expect("渲染通道已关闭")
        .clone();
        assert!(matches!(outcome.display, RenderDisplay::Rendered(_)));
    }

    #[tokio::test]
    async fn test_render_on_change_disabled() {
        let config = EditorConfig {
            render_on_change: false,
            ..EditorConfig::default()
        };
        let (mut editor, surface) = editor(config);

        editor.apply(EditCommand::Insert("x".into())).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(surface.formulas.lock().unwrap().is_empty());
        assert_eq!(editor.bridge().latest().seq, 0);
    }

    #[tokio::test]
    async fn test_external_subscriber_sees_changes() {
        let (mut editor, _) = editor(EditorConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        editor.subscribe(move |change| sink.lock().unwrap().push(change.cursor));

        editor.apply(EditCommand::Insert("ab".into())).unwrap();
        editor.apply(EditCommand::MoveLeft).unwrap();
        editor.apply(EditCommand::Home).unwrap();
        editor.apply(EditCommand::Home).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_normalized_reports_substitutions() {
        let (mut editor, _) = editor(EditorConfig::default());
        editor.apply(EditCommand::Insert("2×3".into())).unwrap();

        let result = editor.normalized();
        assert!(result.changed);
        assert_eq!(result.applied.len(), 1);
        assert_eq!(result.applied[0].glyph, '×');
    }
}
