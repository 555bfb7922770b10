// ==========================================
// 自动化模板目录系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供任意传输层 shell 调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod template_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use template_api::TemplateApi;
