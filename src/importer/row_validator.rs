// ==========================================
// 自动化模板目录系统 - 行校验器实现
// ==========================================
// 职责: 检查已修正行中剩余的硬错误
// ==========================================
// 两套历史校验口径（relaxed / strict）统一为显式策略表，
// 单一管道按策略取舍，不复制分支。
// ==========================================

use crate::domain::template::{AppliedFix, RawTemplateRecord};
use crate::domain::types::ValidationMode;
use crate::importer::template_importer_trait::RowValidator as RowValidatorTrait;

/// slug 允许的字符集: 小写字母 / 数字 / 连字符 / 下划线
fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

// ==========================================
// ValidationPolicy - 校验策略表
// ==========================================
// 哪些字段"出现自动修正即阻断"由数据决定，而非硬编码分支
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub mode: ValidationMode,
    /// strict 模式下，这些字段的任何自动修正都升级为硬错误
    block_on_fix: Vec<&'static str>,
}

impl ValidationPolicy {
    /// 宽容策略（默认）: 只阻断不可修复项
    pub fn relaxed() -> Self {
        Self {
            mode: ValidationMode::Relaxed,
            block_on_fix: Vec::new(),
        }
    }

    /// 严格策略: 被修正过的字段一律视为脏数据
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            block_on_fix: vec![
                "tutorial_url",
                "preview_image_url",
                "download_url",
                "json_url",
                "rating_avg",
                "downloads_count",
                "status",
            ],
        }
    }

    pub fn from_mode(mode: ValidationMode) -> Self {
        match mode {
            ValidationMode::Relaxed => Self::relaxed(),
            ValidationMode::Strict => Self::strict(),
        }
    }

    fn blocks_fix_on(&self, field: &str) -> bool {
        self.block_on_fix.contains(&field)
    }
}

// ==========================================
// RowValidator 实现
// ==========================================
pub struct RowValidator {
    policy: ValidationPolicy,
}

impl RowValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// slug 形态检查（两种策略下均为硬错误，身份键不可修复）
    fn validate_slug(slug: &str, errors: &mut Vec<String>) {
        if slug.is_empty() {
            errors.push("slug 为空".to_string());
            return;
        }
        if slug.chars().count() < 2 {
            errors.push(format!("slug 过短（至少 2 个字符）: '{}'", slug));
        }
        if !slug.chars().all(is_slug_char) {
            errors.push(format!(
                "slug 含非法字符（仅允许小写字母/数字/连字符/下划线）: '{}'",
                slug
            ));
        }
    }

    /// 链接字段: 非空但既无协议、又无前导斜杠、又无点 → 无法判定为链接
    fn validate_url(field: &str, value: Option<&String>, errors: &mut Vec<String>) {
        let Some(v) = value else { return };
        if v.starts_with("http://") || v.starts_with("https://") || v.starts_with('/') {
            return;
        }
        if !v.contains('.') {
            errors.push(format!("字段 {} 不是有效链接: '{}'", field, v));
        }
    }
}

impl RowValidatorTrait for RowValidator {
    fn validate(&self, record: &RawTemplateRecord, fixes: &[AppliedFix]) -> Vec<String> {
        let mut errors = Vec::new();

        Self::validate_slug(&record.slug, &mut errors);

        Self::validate_url("tutorial_url", record.tutorial_url.as_ref(), &mut errors);
        Self::validate_url(
            "preview_image_url",
            record.preview_image_url.as_ref(),
            &mut errors,
        );
        Self::validate_url("download_url", record.download_url.as_ref(), &mut errors);
        Self::validate_url("json_url", record.json_url.as_ref(), &mut errors);

        // strict: 修正清单中的受控字段升级为硬错误
        for fix in fixes {
            if self.policy.blocks_fix_on(&fix.field) {
                errors.push(format!(
                    "字段 {} 的值 '{}' 不符合严格校验策略",
                    fix.field, fix.original
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TemplateStatus;

    fn record(slug: &str) -> RawTemplateRecord {
        RawTemplateRecord {
            slug: slug.to_string(),
            title: "Demo".to_string(),
            description: None,
            platform: "n8n".to_string(),
            author_name: None,
            author_email: None,
            tutorial_url: None,
            preview_image_url: None,
            download_url: None,
            json_url: None,
            language: "pt-BR".to_string(),
            status: TemplateStatus::Draft,
            rating_avg: None,
            downloads_count: None,
            tags: None,
            notes: None,
            external_id: None,
            categories: Vec::new(),
            tools: Vec::new(),
            line_number: 2,
        }
    }

    #[test]
    fn test_valid_slug_passes() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        assert!(validator.validate(&record("my-slug_2"), &[]).is_empty());
    }

    #[test]
    fn test_bad_slug_rejected() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        // 大写 + 空格 + 感叹号均违反字符集
        let errors = validator.validate(&record("My Slug!"), &[]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("非法字符"));
    }

    #[test]
    fn test_short_slug_rejected() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        let errors = validator.validate(&record("a"), &[]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("过短"));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        let errors = validator.validate(&record(""), &[]);
        assert_eq!(errors, vec!["slug 为空".to_string()]);
    }

    #[test]
    fn test_unrecognizable_url_rejected() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        let mut rec = record("demo-1");
        rec.tutorial_url = Some("notaurl".to_string());
        let errors = validator.validate(&rec, &[]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("tutorial_url"));
    }

    #[test]
    fn test_leading_slash_url_allowed() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        let mut rec = record("demo-1");
        rec.download_url = Some("/local/path".to_string());
        assert!(validator.validate(&rec, &[]).is_empty());
    }

    #[test]
    fn test_relaxed_ignores_fixes() {
        let validator = RowValidator::new(ValidationPolicy::relaxed());
        let fixes = vec![AppliedFix {
            field: "rating_avg".to_string(),
            original: "9.9".to_string(),
            corrected: "5".to_string(),
        }];
        assert!(validator.validate(&record("demo-1"), &fixes).is_empty());
    }

    #[test]
    fn test_strict_blocks_fixed_fields() {
        let validator = RowValidator::new(ValidationPolicy::strict());
        let fixes = vec![AppliedFix {
            field: "rating_avg".to_string(),
            original: "9.9".to_string(),
            corrected: "5".to_string(),
        }];
        let errors = validator.validate(&record("demo-1"), &fixes);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("严格校验"));
    }
}
