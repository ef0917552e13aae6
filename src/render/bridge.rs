// 渲染桥
//
// 对核心而言是 fire-and-forget：每次内容变化提交一个新请求，
// 新请求取消仍在进行的旧请求（后写者胜）。渲染失败只降级为错误标记，
// 不会传回缓冲区或调用方。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::render::request::{RenderOptions, RenderRequest};
use crate::render::surface::RenderSurface;

/// 展示状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "snake_case")]
pub enum RenderDisplay {
    /// 尚未渲染
    Empty,
    /// 渲染成功，携带标记片段
    Rendered(String),
    /// 渲染失败，携带错误标记
    Failed(String),
}

impl RenderDisplay {
    /// 由渲染错误生成错误标记
    pub fn error_marker(message: impl std::fmt::Display) -> Self {
        RenderDisplay::Failed(format!("Error: {}", message))
    }
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    pub seq: u64,
    pub formula: String,
    pub display: RenderDisplay,
}

impl RenderOutcome {
    fn empty() -> Self {
        Self {
            seq: 0,
            formula: String::new(),
            display: RenderDisplay::Empty,
        }
    }
}

/// 渲染桥
pub struct RenderBridge<S> {
    surface: Arc<S>,
    options: RenderOptions,
    timeout: Duration,
    next_seq: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    outcome_tx: Arc<watch::Sender<RenderOutcome>>,
}

impl<S: RenderSurface> RenderBridge<S> {
    pub fn new(surface: S, options: RenderOptions, timeout: Duration) -> Self {
        let (outcome_tx, _) = watch::channel(RenderOutcome::empty());
        Self {
            surface: Arc::new(surface),
            options,
            timeout,
            next_seq: AtomicU64::new(1),
            in_flight: Mutex::new(None),
            outcome_tx: Arc::new(outcome_tx),
        }
    }

    /// 提交渲染请求，返回请求序号
    ///
    /// 立即返回；必须在 tokio 运行时内调用
    pub fn submit(&self, formula: &str) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let request = RenderRequest::new(seq, formula, self.options);

        let surface = Arc::clone(&self.surface);
        let outcome_tx = Arc::clone(&self.outcome_tx);
        let timeout = self.timeout;

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                tracing::debug!("Render: 取消被取代的渲染请求 (新 seq={})", seq);
                previous.abort();
            }
        }

        *in_flight = Some(tokio::spawn(async move {
            let display = match tokio::time::timeout(timeout, surface.render(&request)).await {
                Ok(Ok(markup)) => RenderDisplay::Rendered(markup),
                Ok(Err(e)) => {
                    tracing::warn!("Render: 渲染失败 seq={}: {}", request.seq, e);
                    RenderDisplay::error_marker(e)
                }
                Err(_) => {
                    tracing::warn!("Render: 渲染超时 seq={}", request.seq);
                    RenderDisplay::error_marker("render timed out")
                }
            };

            let outcome = RenderOutcome {
                seq: request.seq,
                formula: request.formula,
                display,
            };
            publish(&outcome_tx, outcome);
        }));

        seq
    }

    /// 最近一次发布的渲染结果
    pub fn latest(&self) -> RenderOutcome {
        self.outcome_tx.borrow().clone()
    }

    /// 订阅渲染结果
    pub fn subscribe(&self) -> watch::Receiver<RenderOutcome> {
        self.outcome_tx.subscribe()
    }
}

impl<S> Drop for RenderBridge<S> {
    fn drop(&mut self) {
        let in_flight = self.in_flight.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
    }
}

/// 发布结果，丢弃比当前结果更旧的
fn publish(outcome_tx: &watch::Sender<RenderOutcome>, outcome: RenderOutcome) {
    let seq = outcome.seq;
    let published = outcome_tx.send_if_modified(|current| {
        if outcome.seq > current.seq {
            *current = outcome;
            true
        } else {
            false
        }
    });

    if !published {
        tracing::debug!("Render: 丢弃过期的渲染结果 seq={}", seq);
    }
}
