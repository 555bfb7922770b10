// ==========================================
// 自动化模板目录系统 - 行修正器实现
// ==========================================
// 职责: 原始单元格 → 已清洗 RawTemplateRecord + 修正清单
// ==========================================
// 本阶段永不失败。可修复项就地修复并记录；
// 不可修复项（slug 形态、无法识别的链接）原样保留，交由校验器阻断。
// slug 是身份键，永不被静默修正。
// ==========================================

use crate::domain::template::{AppliedFix, RawTemplateRecord};
use crate::domain::types::TemplateStatus;
use crate::importer::field_normalizer::{
    normalize_list, normalize_optional, normalize_string, parse_f64, parse_i64,
};
use crate::importer::template_importer_trait::{
    ImportDefaults, RowCorrector as RowCorrectorTrait,
};
use std::collections::HashMap;

pub struct RowCorrector;

impl RowCorrector {
    /// 修正链接字段: 裸域名（含点、无协议）补 https:// 前缀
    ///
    /// 其余无法识别的值原样返回，由校验器决定是否阻断。
    fn correct_url(
        field: &str,
        raw: Option<&String>,
        fixes: &mut Vec<AppliedFix>,
    ) -> Option<String> {
        let value = normalize_optional(raw)?;
        if value.starts_with("http://") || value.starts_with("https://") {
            return Some(value);
        }
        if value.contains('.') {
            let corrected = format!("https://{}", value);
            fixes.push(AppliedFix {
                field: field.to_string(),
                original: value,
                corrected: corrected.clone(),
            });
            return Some(corrected);
        }
        Some(value)
    }

    /// 修正评分: 非数值清除为缺失，数值钳制到 [0, 5]
    fn correct_rating(raw: Option<&String>, fixes: &mut Vec<AppliedFix>) -> Option<f64> {
        let value = normalize_optional(raw)?;
        match parse_f64(&value) {
            None => {
                fixes.push(AppliedFix {
                    field: "rating_avg".to_string(),
                    original: value,
                    corrected: String::new(),
                });
                None
            }
            Some(v) if v < 0.0 => {
                fixes.push(AppliedFix {
                    field: "rating_avg".to_string(),
                    original: value,
                    corrected: "0".to_string(),
                });
                Some(0.0)
            }
            Some(v) if v > 5.0 => {
                fixes.push(AppliedFix {
                    field: "rating_avg".to_string(),
                    original: value,
                    corrected: "5".to_string(),
                });
                Some(5.0)
            }
            Some(v) => Some(v),
        }
    }

    /// 修正下载计数: 非数值与负数一律归零
    fn correct_downloads(raw: Option<&String>, fixes: &mut Vec<AppliedFix>) -> Option<i64> {
        let value = normalize_optional(raw)?;
        match parse_i64(&value) {
            None => {
                fixes.push(AppliedFix {
                    field: "downloads_count".to_string(),
                    original: value,
                    corrected: "0".to_string(),
                });
                Some(0)
            }
            Some(v) if v < 0 => {
                fixes.push(AppliedFix {
                    field: "downloads_count".to_string(),
                    original: value,
                    corrected: "0".to_string(),
                });
                Some(0)
            }
            Some(v) => Some(v),
        }
    }

    /// 修正状态: 空值回填默认，无法识别的非空值折叠到默认并记录
    fn correct_status(
        raw: Option<&String>,
        defaults: &ImportDefaults,
        fixes: &mut Vec<AppliedFix>,
    ) -> TemplateStatus {
        let value = normalize_string(raw);
        if value.is_empty() {
            return defaults.status;
        }
        match TemplateStatus::parse(&value) {
            Some(status) => status,
            None => {
                fixes.push(AppliedFix {
                    field: "status".to_string(),
                    original: value,
                    corrected: defaults.status.to_string(),
                });
                defaults.status
            }
        }
    }
}

impl RowCorrectorTrait for RowCorrector {
    fn correct(
        &self,
        cells: &HashMap<String, String>,
        line_number: usize,
        defaults: &ImportDefaults,
    ) -> (RawTemplateRecord, Vec<AppliedFix>) {
        let mut fixes = Vec::new();

        // slug 只做空白归一化，内容绝不改写
        let slug = normalize_string(cells.get("slug"));

        let platform = {
            let p = normalize_string(cells.get("platform"));
            if p.is_empty() {
                defaults.platform.clone()
            } else {
                p
            }
        };

        let language = {
            let l = normalize_string(cells.get("language"));
            if l.is_empty() {
                defaults.language.clone()
            } else {
                l
            }
        };

        let record = RawTemplateRecord {
            slug,
            title: normalize_string(cells.get("title")),
            description: normalize_optional(cells.get("description")),
            platform,
            author_name: normalize_optional(cells.get("author_name")),
            author_email: normalize_optional(cells.get("author_email")),
            tutorial_url: Self::correct_url("tutorial_url", cells.get("tutorial_url"), &mut fixes),
            preview_image_url: Self::correct_url(
                "preview_image_url",
                cells.get("preview_image_url"),
                &mut fixes,
            ),
            download_url: Self::correct_url("download_url", cells.get("download_url"), &mut fixes),
            json_url: Self::correct_url("json_url", cells.get("json_url"), &mut fixes),
            language,
            status: Self::correct_status(cells.get("status"), defaults, &mut fixes),
            rating_avg: Self::correct_rating(cells.get("rating_avg"), &mut fixes),
            downloads_count: Self::correct_downloads(cells.get("downloads_count"), &mut fixes),
            tags: normalize_optional(cells.get("tags")),
            notes: normalize_optional(cells.get("notes")),
            external_id: normalize_optional(cells.get("external_id")),
            categories: normalize_list(cells.get("categories")),
            tools: normalize_list(cells.get("tools")),
            line_number,
        };

        (record, fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ImportDefaults {
        ImportDefaults {
            platform: "other".to_string(),
            language: "pt-BR".to_string(),
            status: TemplateStatus::Draft,
        }
    }

    fn cells(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_correct_bare_domain_url() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[
                ("slug", "demo-1"),
                ("tutorial_url", "youtube.com/watch?v=abc"),
            ]),
            2,
            &defaults(),
        );
        assert_eq!(
            record.tutorial_url.as_deref(),
            Some("https://youtube.com/watch?v=abc")
        );
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].field, "tutorial_url");
    }

    #[test]
    fn test_url_with_scheme_untouched() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("download_url", "http://example.com/x")]),
            2,
            &defaults(),
        );
        assert_eq!(record.download_url.as_deref(), Some("http://example.com/x"));
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_unfixable_url_kept_for_validator() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("json_url", "notaurl")]),
            2,
            &defaults(),
        );
        // 无点无协议: 修正器不动它，留给校验器阻断
        assert_eq!(record.json_url.as_deref(), Some("notaurl"));
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_rating_clamped_not_rejected() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("rating_avg", "7.5")]),
            2,
            &defaults(),
        );
        assert_eq!(record.rating_avg, Some(5.0));
        assert_eq!(fixes.len(), 1);

        let (record, _) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("rating_avg", "-1")]),
            2,
            &defaults(),
        );
        assert_eq!(record.rating_avg, Some(0.0));
    }

    #[test]
    fn test_non_numeric_rating_cleared() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("rating_avg", "excelente")]),
            2,
            &defaults(),
        );
        assert_eq!(record.rating_avg, None);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].original, "excelente");
    }

    #[test]
    fn test_downloads_coerced_to_zero() {
        let corrector = RowCorrector;
        let (record, _) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("downloads_count", "muitos")]),
            2,
            &defaults(),
        );
        assert_eq!(record.downloads_count, Some(0));

        let (record, _) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("downloads_count", "-5")]),
            2,
            &defaults(),
        );
        assert_eq!(record.downloads_count, Some(0));
    }

    #[test]
    fn test_missing_downloads_column_stays_absent() {
        let corrector = RowCorrector;
        let (record, _) = corrector.correct(&cells(&[("slug", "demo-1")]), 2, &defaults());
        assert_eq!(record.downloads_count, None);
    }

    #[test]
    fn test_platform_and_language_defaulted() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("platform", ""), ("language", "  ")]),
            2,
            &defaults(),
        );
        assert_eq!(record.platform, "other");
        assert_eq!(record.language, "pt-BR");
        // 空值回填不计入修正清单
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_unknown_status_folded_with_fix() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "demo-1"), ("status", "em-revisao")]),
            2,
            &defaults(),
        );
        assert_eq!(record.status, TemplateStatus::Draft);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].field, "status");
    }

    #[test]
    fn test_slug_never_rewritten() {
        let corrector = RowCorrector;
        let (record, fixes) = corrector.correct(
            &cells(&[("slug", "  My Slug!  ")]),
            2,
            &defaults(),
        );
        // 仅去空白，内容保持原样（由校验器拒绝）
        assert_eq!(record.slug, "My Slug!");
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_categories_and_tools_split() {
        let corrector = RowCorrector;
        let (record, _) = corrector.correct(
            &cells(&[
                ("slug", "demo-1"),
                ("categories", "marketing|vendas"),
                ("tools", "openai| n8n "),
            ]),
            2,
            &defaults(),
        );
        assert_eq!(record.categories, vec!["marketing", "vendas"]);
        assert_eq!(record.tools, vec!["openai", "n8n"]);
    }
}
