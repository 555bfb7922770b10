// ==========================================
// 自动化模板目录系统 - 导入层
// ==========================================
// 职责: CSV 数据导入与对账（提交 / 预览双模式）
// 流程: 数据源归一 → 解析 → 分类 → 修正 → 校验 → 对账 → 写入/报告
// ==========================================

// 模块声明
pub mod action_classifier;
pub mod csv_source;
pub mod error;
pub mod field_normalizer;
pub mod reconciler;
pub mod row_corrector;
pub mod row_validator;
pub mod template_importer_impl;
pub mod template_importer_trait;

// 重导出核心类型
pub use action_classifier::ActionClassifier as ActionClassifierImpl;
pub use csv_source::{
    sheet_to_csv_export_url, CsvParser, ImportSource, SourceResolver,
    DEFAULT_SHEET_FETCH_TIMEOUT_SECS,
};
pub use error::{ImportError, ImportResult};
pub use reconciler::{Reconciler, RowDecision};
pub use row_corrector::RowCorrector as RowCorrectorImpl;
pub use row_validator::{RowValidator as RowValidatorImpl, ValidationPolicy};
pub use template_importer_impl::TemplateImporterImpl;

// 重导出 Trait 接口
pub use template_importer_trait::{
    ActionClassifier, ImportDefaults, RowCorrector, RowValidator, TabularParser, TemplateImporter,
};
