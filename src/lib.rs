// ==========================================
// 自动化模板目录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 自动化模板目录，含 CSV 导入对账引擎（提交/预览双模式）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RowAction, RowStatus, TemplateStatus, ValidationMode};

// 领域实体
pub use domain::{
    AppliedFix, Category, ImportReport, PreviewReport, RawTemplateRecord, RowOutcome, Template,
    TemplateQuery, Tool,
};

// 导入管道
pub use importer::{ImportSource, TemplateImporter, TemplateImporterImpl, ValidationPolicy};

// API
pub use api::{ImportApi, TemplateApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "自动化模板目录系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
