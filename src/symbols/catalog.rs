//! 符号目录
//!
//! 每个分类一张静态表，表内顺序即网格布局顺序

use super::{Category, Symbol};

static CONSTANTS: &[Symbol] = &[
    Symbol::new("pi", "π", "\\pi"),
    Symbol::new("e", "e", "\\mathrm{e}"),
    Symbol::new("gamma", "γ", "\\gamma"),
    Symbol::new("phi", "φ", "\\phi"),
    Symbol::new("infinity", "∞", "\\infty"),
];

static GREEK_LOWER: &[Symbol] = &[
    Symbol::new("alpha", "α", "\\alpha"),
    Symbol::new("beta", "β", "\\beta"),
    Symbol::new("gamma", "γ", "\\gamma"),
    Symbol::new("delta", "δ", "\\delta"),
    Symbol::new("epsilon", "ε", "\\epsilon"),
    Symbol::new("zeta", "ζ", "\\zeta"),
    Symbol::new("eta", "η", "\\eta"),
    Symbol::new("theta", "θ", "\\theta"),
    Symbol::new("iota", "ι", "\\iota"),
    Symbol::new("kappa", "κ", "\\kappa"),
    Symbol::new("lambda", "λ", "\\lambda"),
    Symbol::new("mu", "μ", "\\mu"),
    Symbol::new("nu", "ν", "\\nu"),
    Symbol::new("xi", "ξ", "\\xi"),
    Symbol::new("pi", "π", "\\pi"),
    Symbol::new("rho", "ρ", "\\rho"),
    Symbol::new("sigma", "σ", "\\sigma"),
    Symbol::new("tau", "τ", "\\tau"),
    Symbol::new("upsilon", "υ", "\\upsilon"),
    Symbol::new("phi", "φ", "\\phi"),
    Symbol::new("chi", "χ", "\\chi"),
    Symbol::new("psi", "ψ", "\\psi"),
    Symbol::new("omega", "ω", "\\omega"),
];

static GREEK_UPPER: &[Symbol] = &[
    Symbol::new("Gamma", "Γ", "\\Gamma"),
    Symbol::new("Delta", "Δ", "\\Delta"),
    Symbol::new("Theta", "Θ", "\\Theta"),
    Symbol::new("Lambda", "Λ", "\\Lambda"),
    Symbol::new("Xi", "Ξ", "\\Xi"),
    Symbol::new("Pi", "Π", "\\Pi"),
    Symbol::new("Sigma", "Σ", "\\Sigma"),
    Symbol::new("Upsilon", "Υ", "\\Upsilon"),
    Symbol::new("Phi", "Φ", "\\Phi"),
    Symbol::new("Psi", "Ψ", "\\Psi"),
    Symbol::new("Omega", "Ω", "\\Omega"),
];

static OPERATORS: &[Symbol] = &[
    Symbol::new("pm", "±", "\\pm"),
    Symbol::new("mp", "∓", "\\mp"),
    Symbol::new("leq", "≤", "\\leq"),
    Symbol::new("geq", "≥", "\\geq"),
    Symbol::new("neq", "≠", "\\neq"),
    Symbol::new("approx", "≈", "\\approx"),
    Symbol::new("equiv", "≡", "\\equiv"),
];

static FUNCTIONS: &[Symbol] = &[
    Symbol::new("sum", "Σ", "\\sum"),
    Symbol::new("prod", "∏", "\\prod"),
    Symbol::new("lim", "lim", "\\lim"),
    Symbol::new("int", "∫", "\\int"),
    Symbol::new("sqrt", "√", "\\sqrt"),
    Symbol::new("frac", "a/b", "\\frac"),
    Symbol::new("sin", "sin", "\\sin"),
    Symbol::new("cos", "cos", "\\cos"),
    Symbol::new("tan", "tan", "\\tan"),
    Symbol::new("log", "log", "\\log"),
    Symbol::new("ln", "ln", "\\ln"),
];

/// 按分类列举符号（声明顺序，稳定）
pub fn list_category(category: Category) -> &'static [Symbol] {
    match category {
        Category::Constants => CONSTANTS,
        Category::GreekLower => GREEK_LOWER,
        Category::GreekUpper => GREEK_UPPER,
        Category::Operators => OPERATORS,
        Category::Functions => FUNCTIONS,
    }
}

/// 查找符号
///
/// 名称区分大小写（"Gamma" 与 "gamma" 属于不同分类）
pub fn lookup(category: Category, name: &str) -> Option<&'static Symbol> {
    list_category(category).iter().find(|s| s.name == name)
}

/// 按显示字形反查符号
///
/// 同一字形可能出现在多个分类中（如 Σ），按符号选择器的分区顺序返回第一个
pub fn find_by_glyph(glyph: &str) -> Option<(Category, &'static Symbol)> {
    Category::PICKER_ORDER.iter().find_map(|&category| {
        list_category(category)
            .iter()
            .find(|s| s.glyph == glyph)
            .map(|s| (category, s))
    })
}
