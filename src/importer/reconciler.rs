// ==========================================
// 自动化模板目录系统 - 行对账器实现
// ==========================================
// 职责: 已分类、已校验的行 + 仓储现状 → 终态决策与写入载荷
// ==========================================
// 终态: insert / update / delete / error，每行恰好一个。
// 本结构为纯逻辑: 查询与写入由编排器执行，便于独立测试。
// ==========================================

use crate::domain::template::{RawTemplateRecord, Template};
use crate::domain::types::RowAction;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// ==========================================
// RowDecision - 单行终态决策
// ==========================================
#[derive(Debug, Clone)]
pub enum RowDecision {
    /// slug 不存在 → 新建（载荷含新 id 与 created_at）
    Insert(Template),
    /// slug 已存在 → 全量替换可变字段（id/slug/created_at 保留）
    Update(Template),
    /// 显式 delete 且目标存在
    Delete(String),
    /// 行级错误；upsert 路径携带修正后的假设载荷供预览展示
    Error {
        message: String,
        hypothetical: Option<Template>,
    },
}

pub struct Reconciler;

impl Reconciler {
    /// 单行状态机
    ///
    /// # 判定顺序
    /// 1. slug 为空 → error（delete 与 upsert 一致）
    /// 2. delete: 目标存在 → delete；不存在 → error（过期删除必须可见）
    /// 3. upsert 存在硬错误 → error，载荷仍按现状装配（仅作展示，绝不写入）
    /// 4. upsert: 按 slug 命中 → update；未命中 → insert
    pub fn reconcile(
        &self,
        action: RowAction,
        record: &RawTemplateRecord,
        hard_errors: &[String],
        existing: Option<&Template>,
        now: DateTime<Utc>,
    ) -> RowDecision {
        if record.slug.is_empty() {
            return RowDecision::Error {
                message: "slug 为空，无法定位记录".to_string(),
                hypothetical: None,
            };
        }

        match action {
            RowAction::Delete => match existing {
                Some(_) => RowDecision::Delete(record.slug.clone()),
                None => RowDecision::Error {
                    message: format!("记录不存在，无法删除: '{}'", record.slug),
                    hypothetical: None,
                },
            },
            RowAction::Upsert => {
                if !hard_errors.is_empty() {
                    return RowDecision::Error {
                        message: hard_errors.join("; "),
                        hypothetical: Some(Self::assemble(record, existing, now)),
                    };
                }
                match existing {
                    Some(current) => {
                        RowDecision::Update(Self::assemble(record, Some(current), now))
                    }
                    None => RowDecision::Insert(Self::assemble(record, None, now)),
                }
            }
        }
    }

    /// 装配写入载荷
    ///
    /// # 规则
    /// - 更新: 提供的字段全量覆盖；id / slug / created_at 永不变更
    /// - 新建: 生成新 UUID，created_at = updated_at = now
    /// - downloads_count 列缺失时，更新保留原值，新建取 0
    fn assemble(
        record: &RawTemplateRecord,
        existing: Option<&Template>,
        now: DateTime<Utc>,
    ) -> Template {
        let (id, created_at, fallback_downloads) = match existing {
            Some(e) => (e.id.clone(), e.created_at, e.downloads_count),
            None => (Uuid::new_v4().to_string(), now, 0),
        };

        Template {
            id,
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            platform: record.platform.clone(),
            author_name: record.author_name.clone(),
            author_email: record.author_email.clone(),
            tutorial_url: record.tutorial_url.clone(),
            preview_image_url: record.preview_image_url.clone(),
            download_url: record.download_url.clone(),
            json_url: record.json_url.clone(),
            language: record.language.clone(),
            status: record.status,
            rating_avg: record.rating_avg,
            downloads_count: record.downloads_count.unwrap_or(fallback_downloads),
            tags: record.tags.clone(),
            notes: record.notes.clone(),
            external_id: record.external_id.clone(),
            categories: record.categories.clone(),
            tools: record.tools.clone(),
            created_at,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TemplateStatus;
    use chrono::Duration;

    fn record(slug: &str) -> RawTemplateRecord {
        RawTemplateRecord {
            slug: slug.to_string(),
            title: "Demo One".to_string(),
            description: Some("desc".to_string()),
            platform: "n8n".to_string(),
            author_name: Some("Autor".to_string()),
            author_email: None,
            tutorial_url: None,
            preview_image_url: None,
            download_url: None,
            json_url: None,
            language: "pt-BR".to_string(),
            status: TemplateStatus::Published,
            rating_avg: Some(4.5),
            downloads_count: None,
            tags: None,
            notes: None,
            external_id: None,
            categories: vec!["marketing".to_string()],
            tools: vec!["openai".to_string()],
            line_number: 2,
        }
    }

    fn existing(slug: &str) -> Template {
        let created = Utc::now() - Duration::days(30);
        Template {
            id: "fixed-id".to_string(),
            slug: slug.to_string(),
            title: "Old Title".to_string(),
            description: None,
            platform: "make".to_string(),
            author_name: None,
            author_email: None,
            tutorial_url: None,
            preview_image_url: None,
            download_url: None,
            json_url: None,
            language: "pt-BR".to_string(),
            status: TemplateStatus::Draft,
            rating_avg: None,
            downloads_count: 42,
            tags: None,
            notes: None,
            external_id: None,
            categories: Vec::new(),
            tools: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_upsert_without_existing_is_insert() {
        let now = Utc::now();
        let decision = Reconciler.reconcile(RowAction::Upsert, &record("demo-1"), &[], None, now);
        match decision {
            RowDecision::Insert(t) => {
                assert_eq!(t.slug, "demo-1");
                assert_eq!(t.downloads_count, 0);
                assert_eq!(t.created_at, now);
                assert_eq!(t.updated_at, now);
                assert!(!t.id.is_empty());
            }
            other => panic!("期望 Insert，实际 {:?}", other),
        }
    }

    #[test]
    fn test_upsert_with_existing_is_update_preserving_identity() {
        let now = Utc::now();
        let old = existing("demo-1");
        let decision =
            Reconciler.reconcile(RowAction::Upsert, &record("demo-1"), &[], Some(&old), now);
        match decision {
            RowDecision::Update(t) => {
                assert_eq!(t.id, "fixed-id");
                assert_eq!(t.created_at, old.created_at);
                assert_eq!(t.updated_at, now);
                assert_eq!(t.title, "Demo One");
                // downloads 列缺失 → 保留原值
                assert_eq!(t.downloads_count, 42);
            }
            other => panic!("期望 Update，实际 {:?}", other),
        }
    }

    #[test]
    fn test_delete_existing() {
        let old = existing("demo-1");
        let decision = Reconciler.reconcile(
            RowAction::Delete,
            &record("demo-1"),
            &[],
            Some(&old),
            Utc::now(),
        );
        assert!(matches!(decision, RowDecision::Delete(slug) if slug == "demo-1"));
    }

    #[test]
    fn test_delete_missing_is_visible_error() {
        let decision =
            Reconciler.reconcile(RowAction::Delete, &record("gone-1"), &[], None, Utc::now());
        match decision {
            RowDecision::Error { message, .. } => assert!(message.contains("无法删除")),
            other => panic!("期望 Error，实际 {:?}", other),
        }
    }

    #[test]
    fn test_empty_slug_is_error_for_both_actions() {
        for action in [RowAction::Upsert, RowAction::Delete] {
            let decision = Reconciler.reconcile(action, &record(""), &[], None, Utc::now());
            match decision {
                RowDecision::Error { message, .. } => assert!(message.contains("slug")),
                other => panic!("期望 Error，实际 {:?}", other),
            }
        }
    }

    #[test]
    fn test_hard_errors_block_write_but_carry_payload() {
        let errors = vec!["slug 含非法字符".to_string()];
        let decision =
            Reconciler.reconcile(RowAction::Upsert, &record("demo-1"), &errors, None, Utc::now());
        match decision {
            RowDecision::Error {
                message,
                hypothetical,
            } => {
                assert!(message.contains("非法字符"));
                // 预览端仍能看到假设载荷
                assert!(hypothetical.is_some());
            }
            other => panic!("期望 Error，实际 {:?}", other),
        }
    }
}
