// 渲染表面
//
// 外部渲染器的抽象。渲染器在独立的表面（浏览器 / WebView）中运行，
// 核心只负责把请求交给它并接收成功或失败的反馈。

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::atomic_file::replace_file;
use crate::config::RenderConfig;
use crate::render::request::RenderRequest;

/// 外部渲染表面
pub trait RenderSurface: Send + Sync + 'static {
    /// 渲染请求，成功时返回标记片段（或其位置）
    fn render(&self, request: &RenderRequest) -> impl Future<Output = Result<String>> + Send;
}

/// HTML 文件表面
///
/// 把承载页写入输出目录，由浏览器打开；返回写入的文件路径
pub struct HtmlFileSurface {
    output_path: PathBuf,
    config: RenderConfig,
    write_lock: Arc<Mutex<()>>,
}

impl HtmlFileSurface {
    pub const FILE_NAME: &'static str = "formula.html";

    pub fn new(output_dir: &Path, config: RenderConfig) -> Self {
        Self {
            output_path: output_dir.join(Self::FILE_NAME),
            config,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl RenderSurface for HtmlFileSurface {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        let html = request.html_document(&self.config);

        // 原子写入：浏览器不会读到半个文件
        let output_path = self.output_path.clone();
        let write_lock = Arc::clone(&self.write_lock);
        tokio::task::spawn_blocking(move || {
            // 被取代的请求的写入仍可能在进行，同一时刻只允许一个写入
            let _guard = write_lock.lock().unwrap_or_else(|e| e.into_inner());
            replace_file(&output_path, html.as_bytes())
        })
            .await
            .map_err(|e| anyhow::anyhow!("渲染页写入任务失败: {}", e))?
            .map_err(|e| anyhow::anyhow!("写入渲染页失败: {}", e))?;

        tracing::debug!(
            "Render: 渲染页已更新 seq={} path={:?}",
            request.seq,
            self.output_path
        );
        Ok(self.output_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::request::render;

    #[tokio::test]
    async fn html_surface_should_write_document() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let surface = HtmlFileSurface::new(temp.path(), RenderConfig::default());

        let markup = surface.render(&render("\\sqrt{2}")).await.expect("render");
        assert_eq!(markup, surface.output_path().display().to_string());

        let html = std::fs::read_to_string(surface.output_path()).expect("read html");
        assert!(html.contains(r#"katex.render("\\sqrt{2}""#));
        assert!(!surface.output_path().with_extension("html.tmp").exists());
    }

    #[tokio::test]
    async fn html_surface_should_fail_when_dir_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let surface = HtmlFileSurface::new(&temp.path().join("missing"), RenderConfig::default());

        assert!(surface.render(&render("x")).await.is_err());
    }

    #[tokio::test]
    async fn html_surface_should_replace_previous_page() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let surface = HtmlFileSurface::new(temp.path(), RenderConfig::default());

        surface.render(&render("1")).await.expect("first render");
        surface.render(&render("\\pi")).await.expect("second render");

        let html = std::fs::read_to_string(surface.output_path()).expect("read html");
        assert!(html.contains(r#"katex.render("\\pi""#));
        assert!(!html.contains(r#"katex.render("1""#));
        assert!(!surface.output_path().with_extension("html.bak").exists());
    }
}
