// ==========================================
// 自动化模板目录系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================
// 约定: 本枚举只承载"源级"失败（在任何行被处理前中止整次导入）。
// 行级失败以字符串记入报告，不走 Err 通道。
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源选择错误 =====
    #[error("未提供数据源（需提供 CSV 文件或表格链接）")]
    MissingSource,

    #[error("数据源冲突（CSV 文件与表格链接只能二选一）")]
    AmbiguousSource,

    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件内容为空")]
    EmptyContent,

    #[error("文件编码错误（仅支持 UTF-8）: {0}")]
    EncodingError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 远程表格错误 =====
    #[error("无法识别的表格链接: {0}")]
    InvalidSheetUrl(String),

    #[error("表格抓取失败: {0}")]
    SheetFetchError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigReadError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        ImportError::SheetFetchError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
