// ==========================================
// 自动化模板目录系统 - 字段归一化
// ==========================================
// 职责: TRIM / NaN 标准化 / 竖线列表拆分 / 宽容数值解析
// ==========================================
// 本层为纯函数，永不拒绝输入，只做清洗。
// ==========================================

/// 判断单元格文本是否为"空值等价物"
///
/// 上游表格导出常把缺失单元格渲染成 NaN/null 字面量，
/// 这些值一律视同缺失。
fn is_nan_like(trimmed: &str) -> bool {
    matches!(
        trimmed.to_ascii_lowercase().as_str(),
        "nan" | "null" | "none"
    )
}

/// 归一化为非空字符串语义
///
/// # 返回
/// - 缺失/空白/NaN 等价物 → ""
/// - 其余 → 去除首尾空白后的文本
pub fn normalize_string(raw: Option<&String>) -> String {
    let Some(v) = raw else {
        return String::new();
    };
    let trimmed = v.trim();
    if trimmed.is_empty() || is_nan_like(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// 归一化为可选字符串语义（空结果坍缩为 None）
pub fn normalize_optional(raw: Option<&String>) -> Option<String> {
    let cleaned = normalize_string(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// 归一化竖线分隔列表（`a|b|c`）
///
/// # 返回
/// - 各段去除空白、空段丢弃后的有序列表
/// - 缺失/NaN 等价物 → 空列表
pub fn normalize_list(raw: Option<&String>) -> Vec<String> {
    let cleaned = normalize_string(raw);
    if cleaned.is_empty() {
        return Vec::new();
    }
    cleaned
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 宽容解析浮点数
///
/// # 返回
/// - Some(f64): 可解析且有限
/// - None: 无法解析（由策略层决定含义，本层不报错）
pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 宽容解析整数
///
/// 表格导出常把整数列渲染为 "1500.0"，先按整数、再按浮点截断解析。
pub fn parse_i64(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    parse_f64(trimmed).map(|v| v.trunc() as i64)
}
