// ==========================================
// 自动化模板目录系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{TemplateStatus, ValidationMode};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取平台回填默认值
    ///
    /// # 默认值
    /// - "other"
    async fn get_default_platform(&self) -> Result<String, Box<dyn Error>>;

    /// 获取语言代码回填默认值
    ///
    /// # 默认值
    /// - "pt-BR"
    async fn get_default_language(&self) -> Result<String, Box<dyn Error>>;

    /// 获取生命周期状态回填默认值
    ///
    /// # 默认值
    /// - draft
    async fn get_default_status(&self) -> Result<TemplateStatus, Box<dyn Error>>;

    /// 获取校验策略模式
    ///
    /// # 默认值
    /// - relaxed
    async fn get_validation_mode(&self) -> Result<ValidationMode, Box<dyn Error>>;

    /// 获取表格抓取超时（秒）
    ///
    /// # 默认值
    /// - 30
    async fn get_sheet_fetch_timeout_secs(&self) -> Result<u64, Box<dyn Error>>;
}
