//! 渲染桥
//!
//! 把规范化后的公式交给外部排版渲染器（KaTeX）。
//!
//! - escape: 嵌入调用脚本前的转义（可逆）
//! - request: 渲染请求与承载页
//! - surface: 外部渲染表面抽象
//! - bridge: 后写者胜的异步分发

mod bridge;
mod escape;
mod request;
mod surface;

pub use bridge::{RenderBridge, RenderDisplay, RenderOutcome};
pub use escape::{escape_formula, unescape_formula};
pub use request::{render, RenderOptions, RenderRequest, FORMULA_ELEMENT_ID};
pub use surface::{HtmlFileSurface, RenderSurface};
