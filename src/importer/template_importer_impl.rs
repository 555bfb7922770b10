// ==========================================
// 自动化模板目录系统 - 导入编排器实现
// ==========================================
// 流程: 解析 → 分类 → 修正 → 校验 → 对账 → 写入/报告
// ==========================================
// 提交与预览共用同一条处理路径，唯一分叉是"写或不写"。
// 行严格按源文件顺序串行: 同一文件内后行引用相同 slug 时，
// 必须能观察到前行在提交模式下的写入效果。
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::template::{ImportReport, PreviewReport, RowOutcome};
use crate::domain::types::{RowAction, RowStatus};
use crate::importer::csv_source::{ImportSource, SourceResolver};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::reconciler::{Reconciler, RowDecision};
use crate::importer::template_importer_trait::{
    ActionClassifier, ImportDefaults, RowCorrector, RowValidator, TabularParser, TemplateImporter,
};
use crate::repository::TemplateRepository;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

// ==========================================
// TemplateImporterImpl - 导入编排器
// ==========================================
pub struct TemplateImporterImpl<R, C>
where
    R: TemplateRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: R,

    // 配置读取器
    config: C,

    // 管道组件
    source_resolver: SourceResolver,
    parser: Box<dyn TabularParser>,
    corrector: Box<dyn RowCorrector>,
    validator: Box<dyn RowValidator>,
    classifier: Box<dyn ActionClassifier>,
    reconciler: Reconciler,
}

impl<R, C> TemplateImporterImpl<R, C>
where
    R: TemplateRepository,
    C: ImportConfigReader,
{
    /// 创建新的导入编排器
    ///
    /// # 参数
    /// - repo: 模板仓储
    /// - config: 配置读取器
    /// - source_resolver: 数据源解析器（超时已按配置装配）
    /// - parser / corrector / validator / classifier: 管道各阶段
    pub fn new(
        repo: R,
        config: C,
        source_resolver: SourceResolver,
        parser: Box<dyn TabularParser>,
        corrector: Box<dyn RowCorrector>,
        validator: Box<dyn RowValidator>,
        classifier: Box<dyn ActionClassifier>,
    ) -> Self {
        Self {
            repo,
            config,
            source_resolver,
            parser,
            corrector,
            validator,
            classifier,
            reconciler: Reconciler,
        }
    }

    /// 读取行级回填默认值（每次导入读取一次）
    async fn load_defaults(&self) -> ImportResult<ImportDefaults> {
        let platform = self
            .config
            .get_default_platform()
            .await
            .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;
        let language = self
            .config
            .get_default_language()
            .await
            .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;
        let status = self
            .config
            .get_default_status()
            .await
            .map_err(|e| ImportError::ConfigReadError(e.to_string()))?;

        Ok(ImportDefaults {
            platform,
            language,
            status,
        })
    }

    /// 共用处理路径: 提交与预览只差 commit 标志
    async fn process(&self, source: &ImportSource, commit: bool) -> ImportResult<PreviewReport> {
        let mode = if commit { "commit" } else { "preview" };

        // === 阶段 0: 数据源归一 + 解析 ===
        // 源级失败在此中止，任何行都不会被处理
        let text = self.source_resolver.resolve(source).await?;
        let rows = self.parser.parse_rows(&text)?;
        info!(mode, total_rows = rows.len(), "表格解析完成");

        let defaults = self.load_defaults().await?;

        let mut report = PreviewReport {
            total_rows: rows.len(),
            ..PreviewReport::default()
        };

        // === 阶段 1-4: 逐行串行处理 ===
        for (line_number, cells) in &rows {
            let outcome = self
                .process_row(*line_number, cells, &defaults, commit)
                .await;

            match outcome.status {
                RowStatus::Insert => report.insert_count += 1,
                RowStatus::Update => report.update_count += 1,
                RowStatus::Delete => report.delete_count += 1,
                RowStatus::Error => report.error_count += 1,
            }
            report.rows.push(outcome);
        }

        info!(
            mode,
            total = report.total_rows,
            insert = report.insert_count,
            update = report.update_count,
            delete = report.delete_count,
            errors = report.error_count,
            "导入处理完成"
        );

        Ok(report)
    }

    /// 处理单行，永远返回一个终态结果（行级失败不外抛）
    async fn process_row(
        &self,
        line_number: usize,
        cells: &HashMap<String, String>,
        defaults: &ImportDefaults,
        commit: bool,
    ) -> RowOutcome {
        let action_raw = cells.get("action").map(String::as_str).unwrap_or("");

        // 修正器永不失败，对 delete 行同样提供 slug/title 归一
        let (record, fixes) = self.corrector.correct(cells, line_number, defaults);
        let slug = record.slug.clone();
        let title = record.title.clone();

        // === 分类 ===
        let action = match self.classifier.classify(action_raw) {
            Ok(action) => action,
            Err(message) => {
                warn!(line = line_number, action = action_raw, "action 无法识别");
                return RowOutcome {
                    line_number,
                    status: RowStatus::Error,
                    action: None,
                    slug,
                    title,
                    message,
                    fixes,
                    data: None,
                };
            }
        };

        // === 校验（仅 upsert 路径，delete 只需 slug 定位）===
        let hard_errors = match action {
            RowAction::Upsert => self.validator.validate(&record, &fixes),
            RowAction::Delete => Vec::new(),
        };

        // === 现状查询 ===
        let existing = if record.slug.is_empty() {
            None
        } else {
            match self.repo.find_by_slug(&record.slug).await {
                Ok(existing) => existing,
                Err(e) => {
                    error!(line = line_number, slug = %record.slug, error = %e, "仓储查询失败");
                    return RowOutcome {
                        line_number,
                        status: RowStatus::Error,
                        action: Some(action),
                        slug,
                        title,
                        message: format!("仓储查询失败: {}", e),
                        fixes,
                        data: None,
                    };
                }
            }
        };

        // === 对账 ===
        let decision =
            self.reconciler
                .reconcile(action, &record, &hard_errors, existing.as_ref(), Utc::now());

        match decision {
            RowDecision::Insert(template) => {
                if commit {
                    if let Err(e) = self.repo.upsert_by_slug(&template.slug, &template).await {
                        error!(line = line_number, slug = %template.slug, error = %e, "写入失败");
                        return RowOutcome {
                            line_number,
                            status: RowStatus::Error,
                            action: Some(action),
                            slug,
                            title,
                            message: format!("写入失败: {}", e),
                            fixes,
                            data: None,
                        };
                    }
                }
                debug!(line = line_number, slug = %template.slug, "新增模板");
                RowOutcome {
                    line_number,
                    status: RowStatus::Insert,
                    action: Some(action),
                    slug,
                    title,
                    message: Self::success_message("新增模板", &fixes),
                    fixes,
                    data: Some(template),
                }
            }
            RowDecision::Update(template) => {
                if commit {
                    if let Err(e) = self.repo.upsert_by_slug(&template.slug, &template).await {
                        error!(line = line_number, slug = %template.slug, error = %e, "写入失败");
                        return RowOutcome {
                            line_number,
                            status: RowStatus::Error,
                            action: Some(action),
                            slug,
                            title,
                            message: format!("写入失败: {}", e),
                            fixes,
                            data: None,
                        };
                    }
                }
                debug!(line = line_number, slug = %template.slug, "更新模板");
                RowOutcome {
                    line_number,
                    status: RowStatus::Update,
                    action: Some(action),
                    slug,
                    title,
                    message: Self::success_message("更新已有模板", &fixes),
                    fixes,
                    data: Some(template),
                }
            }
            RowDecision::Delete(target_slug) => {
                if commit {
                    match self.repo.delete_by_slug(&target_slug).await {
                        Ok(true) => {}
                        Ok(false) => {
                            // 查找与删除之间被并发移除，按过期删除处理
                            return RowOutcome {
                                line_number,
                                status: RowStatus::Error,
                                action: Some(action),
                                slug,
                                title,
                                message: format!("记录不存在，无法删除: '{}'", target_slug),
                                fixes,
                                data: None,
                            };
                        }
                        Err(e) => {
                            error!(line = line_number, slug = %target_slug, error = %e, "删除失败");
                            return RowOutcome {
                                line_number,
                                status: RowStatus::Error,
                                action: Some(action),
                                slug,
                                title,
                                message: format!("删除失败: {}", e),
                                fixes,
                                data: None,
                            };
                        }
                    }
                }
                debug!(line = line_number, slug = %target_slug, "删除模板");
                RowOutcome {
                    line_number,
                    status: RowStatus::Delete,
                    action: Some(action),
                    slug,
                    title,
                    message: "删除模板".to_string(),
                    fixes,
                    data: None,
                }
            }
            RowDecision::Error {
                message,
                hypothetical,
            } => {
                warn!(line = line_number, slug = %slug, message = %message, "行级错误");
                RowOutcome {
                    line_number,
                    status: RowStatus::Error,
                    action: Some(action),
                    slug,
                    title,
                    message,
                    fixes,
                    // 预览端据此展示"本应写入"的载荷
                    data: hypothetical,
                }
            }
        }
    }

    /// 成功消息不得掩盖自动修正的存在
    fn success_message(base: &str, fixes: &[crate::domain::template::AppliedFix]) -> String {
        if fixes.is_empty() {
            base.to_string()
        } else {
            format!("{}（应用 {} 处自动修正）", base, fixes.len())
        }
    }
}

#[async_trait::async_trait]
impl<R, C> TemplateImporter for TemplateImporterImpl<R, C>
where
    R: TemplateRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    async fn run_import(&self, source: &ImportSource) -> ImportResult<ImportReport> {
        let preview = self.process(source, true).await?;

        let errors = preview
            .rows
            .iter()
            .filter(|row| row.status == RowStatus::Error)
            .map(|row| format!("行 {}: {}", row.line_number, row.message))
            .collect();

        Ok(ImportReport {
            inserted: preview.insert_count,
            updated: preview.update_count,
            deleted: preview.delete_count,
            errors,
        })
    }

    async fn run_preview(&self, source: &ImportSource) -> ImportResult<PreviewReport> {
        self.process(source, false).await
    }

    async fn batch_import(
        &self,
        sources: Vec<ImportSource>,
    ) -> ImportResult<Vec<Result<ImportReport, String>>> {
        use futures::future::join_all;

        info!(count = sources.len(), "开始批量导入");

        let tasks = sources.iter().map(|source| async move {
            match self.run_import(source).await {
                Ok(report) => {
                    info!(
                        inserted = report.inserted,
                        updated = report.updated,
                        deleted = report.deleted,
                        errors = report.errors.len(),
                        "数据源导入完成"
                    );
                    Ok(report)
                }
                Err(e) => {
                    error!(error = %e, "数据源导入失败");
                    Err(format!("导入失败: {}", e))
                }
            }
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        Ok(results)
    }
}
