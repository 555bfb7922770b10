// ==========================================
// 自动化模板目录系统 - 导入 API
// ==========================================
// 职责: 封装导入/预览入口，装配管道组件
// 说明: 本层不绑定任何传输协议，供上层 shell（HTTP/CLI 等）调用
// ==========================================

use crate::api::error::ApiError;
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::template::{ImportReport, PreviewReport};
use crate::importer::{
    ActionClassifierImpl, CsvParser, ImportError, ImportSource, RowCorrectorImpl,
    RowValidatorImpl, SourceResolver, TemplateImporter, TemplateImporterImpl, ValidationPolicy,
};
use crate::repository::TemplateRepositoryImpl;
use tracing::info;

/// 导入 API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的 ImportApi 实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 预览导入（dry-run，不产生任何写入）
    ///
    /// # 参数
    /// - file: (文件名, 原始字节)，与 sheet_url 二选一
    /// - sheet_url: Google Sheets 链接，与 file 二选一
    ///
    /// # 返回
    /// - Ok(PreviewReport): 总行数、各终态计数、逐行结果
    /// - Err(ApiError): 请求错误或源级失败
    pub async fn run_preview(
        &self,
        file: Option<(String, Vec<u8>)>,
        sheet_url: Option<String>,
    ) -> Result<PreviewReport, ApiError> {
        let source = Self::resolve_source(file, sheet_url)?;
        let importer = self.create_importer().await?;

        importer
            .run_preview(&source)
            .await
            .map_err(Self::map_import_error)
    }

    /// 提交导入（逐行写入仓储）
    ///
    /// # 返回
    /// - Ok(ImportReport): 新增/更新/删除计数 + 带行号的错误列表
    /// - Err(ApiError): 请求错误或源级失败（未写入任何行）
    pub async fn run_import(
        &self,
        file: Option<(String, Vec<u8>)>,
        sheet_url: Option<String>,
    ) -> Result<ImportReport, ApiError> {
        let source = Self::resolve_source(file, sheet_url)?;
        let importer = self.create_importer().await?;

        let report = importer
            .run_import(&source)
            .await
            .map_err(Self::map_import_error)?;

        info!(
            inserted = report.inserted,
            updated = report.updated,
            deleted = report.deleted,
            errors = report.errors.len(),
            "导入提交完成"
        );
        Ok(report)
    }

    /// 批量导入本地 CSV 文件（并发执行，每个文件独立报告）
    pub async fn import_files(
        &self,
        paths: Vec<String>,
    ) -> Result<Vec<Result<ImportReport, String>>, ApiError> {
        let mut sources = Vec::new();
        for path in paths {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| ApiError::InvalidInput(format!("文件读取失败 {}: {}", path, e)))?;
            sources.push(ImportSource::File { name: path, bytes });
        }

        let importer = self.create_importer().await?;
        importer
            .batch_import(sources)
            .await
            .map_err(Self::map_import_error)
    }

    /// 数据源裁决: 文件与链接二选一
    fn resolve_source(
        file: Option<(String, Vec<u8>)>,
        sheet_url: Option<String>,
    ) -> Result<ImportSource, ApiError> {
        ImportSource::from_parts(file, sheet_url).map_err(|e| match e {
            ImportError::MissingSource | ImportError::AmbiguousSource => {
                ApiError::InvalidInput(e.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        })
    }

    /// 装配导入编排器（组件与策略按配置取值）
    async fn create_importer(
        &self,
    ) -> Result<TemplateImporterImpl<TemplateRepositoryImpl, ConfigManager>, ApiError> {
        let repo = TemplateRepositoryImpl::new(&self.db_path)
            .map_err(|e| ApiError::DatabaseError(format!("创建仓储失败: {}", e)))?;
        let config = ConfigManager::new(&self.db_path)
            .map_err(|e| ApiError::ConfigError(format!("创建配置管理器失败: {}", e)))?;

        let validation_mode = config
            .get_validation_mode()
            .await
            .map_err(|e| ApiError::ConfigError(format!("读取校验策略失败: {}", e)))?;
        let fetch_timeout = config
            .get_sheet_fetch_timeout_secs()
            .await
            .map_err(|e| ApiError::ConfigError(format!("读取抓取超时失败: {}", e)))?;

        Ok(TemplateImporterImpl::new(
            repo,
            config,
            SourceResolver::new(fetch_timeout),
            Box::new(CsvParser),
            Box::new(RowCorrectorImpl),
            Box::new(RowValidatorImpl::new(ValidationPolicy::from_mode(
                validation_mode,
            ))),
            Box::new(ActionClassifierImpl),
        ))
    }

    fn map_import_error(err: ImportError) -> ApiError {
        match err {
            ImportError::MissingSource | ImportError::AmbiguousSource => {
                ApiError::InvalidInput(err.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}
