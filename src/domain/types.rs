// ==========================================
// 自动化模板目录系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 模板生命周期状态 (Template Status)
// ==========================================
// 序列化格式: 小写 (与数据库/CSV 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,     // 草稿
    Published, // 已发布
    Archived,  // 已归档
}

impl TemplateStatus {
    /// 从文本解析状态（不区分大小写）
    ///
    /// # 返回
    /// - Some(TemplateStatus): 合法状态值
    /// - None: 无法识别
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "draft" => Some(TemplateStatus::Draft),
            "published" => Some(TemplateStatus::Published),
            "archived" => Some(TemplateStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Published => "published",
            TemplateStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 行操作类型 (Row Action)
// ==========================================
// CSV `action` 列的合法取值，其余值一律拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Upsert, // 插入或更新（按 slug 定位）
    Delete, // 删除（按 slug 定位）
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowAction::Upsert => write!(f, "upsert"),
            RowAction::Delete => write!(f, "delete"),
        }
    }
}

// ==========================================
// 行处理结果状态 (Row Status)
// ==========================================
// 每行处理的终态，预览与提交两种模式共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Insert, // 新增
    Update, // 更新
    Delete, // 删除
    Error,  // 行级错误（不阻断其他行）
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Insert => write!(f, "insert"),
            RowStatus::Update => write!(f, "update"),
            RowStatus::Delete => write!(f, "delete"),
            RowStatus::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// 校验策略模式 (Validation Mode)
// ==========================================
// relaxed: 可修复字段自动修正，仅不可修复项阻断
// strict: 自动修正一律升级为硬错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Relaxed,
    Strict,
}

impl ValidationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "relaxed" => Some(ValidationMode::Relaxed),
            "strict" => Some(ValidationMode::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Relaxed => write!(f, "relaxed"),
            ValidationMode::Strict => write!(f, "strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_status_parse() {
        assert_eq!(TemplateStatus::parse("draft"), Some(TemplateStatus::Draft));
        assert_eq!(
            TemplateStatus::parse(" Published "),
            Some(TemplateStatus::Published)
        );
        assert_eq!(TemplateStatus::parse("ARCHIVED"), Some(TemplateStatus::Archived));
        assert_eq!(TemplateStatus::parse("ready"), None);
        assert_eq!(TemplateStatus::parse(""), None);
    }

    #[test]
    fn test_validation_mode_parse() {
        assert_eq!(ValidationMode::parse("strict"), Some(ValidationMode::Strict));
        assert_eq!(ValidationMode::parse("Relaxed"), Some(ValidationMode::Relaxed));
        assert_eq!(ValidationMode::parse("loose"), None);
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(TemplateStatus::Published.to_string(), "published");
        assert_eq!(RowAction::Delete.to_string(), "delete");
        assert_eq!(RowStatus::Error.to_string(), "error");
    }
}
