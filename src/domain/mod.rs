// ==========================================
// 自动化模板目录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑，不含管道逻辑
// ==========================================

pub mod template;
pub mod types;

// 重导出核心类型
pub use template::{
    AppliedFix, Category, ImportReport, PreviewReport, RawTemplateRecord, RowOutcome, Template,
    TemplateQuery, Tool,
};
pub use types::{RowAction, RowStatus, TemplateStatus, ValidationMode};
