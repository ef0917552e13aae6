// 渲染调试工具 - 查看公式交给 KaTeX 前的规范化结果、转义载荷与调用脚本
//
// 用法: render_probe [--html] [--write] <公式>
use anyhow::Result;
use formula_keypad_lib::config::AppConfig;
use formula_keypad_lib::latex::FormulaNormalizer;
use formula_keypad_lib::render::{
    unescape_formula, HtmlFileSurface, RenderOptions, RenderRequest, RenderSurface,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("=== KaTeX 渲染调试工具 ===\n");

    let mut show_html = false;
    let mut write_file = false;
    let mut formula_parts = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--html" => show_html = true,
            "--write" => write_file = true,
            _ => formula_parts.push(arg),
        }
    }

    // 1. 获取公式
    let raw = if formula_parts.is_empty() {
        println!("请输入公式:");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        input.trim_end_matches(['\r', '\n']).to_string()
    } else {
        formula_parts.join(" ")
    };

    if raw.is_empty() {
        anyhow::bail!("公式不能为空");
    }
    println!("✓ 原始公式: {}\n", raw);

    // 2. 加载配置（不写回）
    let (config, _) = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("加载配置失败，使用默认配置: {}", e);
        (AppConfig::default(), false)
    });

    // 3. 规范化
    let normalized = FormulaNormalizer::new().normalize(&raw);
    println!("=== 规范化 ({} μs) ===", normalized.elapsed_us);
    println!("{}", normalized.text);
    for substitution in &normalized.applied {
        println!(
            "  #{} {} → {:?}",
            substitution.index, substitution.glyph, substitution.replaced
        );
    }
    println!();

    // 4. 构建请求
    let request = RenderRequest::new(1, &normalized.text, RenderOptions::from(&config.render));
    println!("=== 转义载荷 ===");
    println!("{}", request.escaped);
    if unescape_formula(&request.escaped) != request.formula {
        anyhow::bail!("转义载荷无法还原为原公式");
    }
    println!("✓ 载荷可还原\n");

    println!("=== 调用脚本 ===");
    println!("{}\n", request.invocation_script());

    if show_html {
        println!("=== 承载页 ===");
        println!("{}", request.html_document(&config.render));
    }

    // 5. 写入渲染页
    if write_file {
        let output_dir = config.render.resolve_output_dir()?;
        let surface = HtmlFileSurface::new(&output_dir, config.render.clone());
        let path = surface.render(&request).await?;
        println!("✅ 渲染页已写入: {}", path);
    }

    Ok(())
}
