// ==========================================
// 自动化模板目录系统 - API 层错误类型
// ==========================================
// 职责: 定义 API 层错误类型，转换内层错误为用户可读的错误消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("导入错误: {0}")]
    ImportError(String),

    // ==========================================
    // 基础设施错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
