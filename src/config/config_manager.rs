// ==========================================
// 自动化模板目录系统 - 配置管理器
// ==========================================
// 存储: config_kv 表（key/value 文本对）
// 读取: 缺失键回退到编译期默认值，不报错
// ==========================================

use crate::db::open_sqlite_connection;
use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::{TemplateStatus, ValidationMode};
use crate::importer::csv_source::DEFAULT_SHEET_FETCH_TIMEOUT_SECS;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键全集
pub mod config_keys {
    pub const DEFAULT_PLATFORM: &str = "import.default_platform";
    pub const DEFAULT_LANGUAGE: &str = "import.default_language";
    pub const DEFAULT_STATUS: &str = "import.default_status";
    pub const VALIDATION_MODE: &str = "import.validation_mode";
    pub const SHEET_FETCH_TIMEOUT_SECS: &str = "import.sheet_fetch_timeout_secs";
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的配置管理器
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 读取配置值（键不存在时返回 None）
    pub fn get_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("配置连接锁获取失败: {}", e))?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("配置连接锁获取失败: {}", e))?;
        conn.execute(
            "INSERT OR REPLACE INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_default_platform(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_value(config_keys::DEFAULT_PLATFORM)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "other".to_string()))
    }

    async fn get_default_language(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_value(config_keys::DEFAULT_LANGUAGE)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "pt-BR".to_string()))
    }

    async fn get_default_status(&self) -> Result<TemplateStatus, Box<dyn Error>> {
        Ok(self
            .get_value(config_keys::DEFAULT_STATUS)?
            .and_then(|v| TemplateStatus::parse(&v))
            .unwrap_or(TemplateStatus::Draft))
    }

    async fn get_validation_mode(&self) -> Result<ValidationMode, Box<dyn Error>> {
        Ok(self
            .get_value(config_keys::VALIDATION_MODE)?
            .and_then(|v| ValidationMode::parse(&v))
            .unwrap_or(ValidationMode::Relaxed))
    }

    async fn get_sheet_fetch_timeout_secs(&self) -> Result<u64, Box<dyn Error>> {
        Ok(self
            .get_value(config_keys::SHEET_FETCH_TIMEOUT_SECS)?
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SHEET_FETCH_TIMEOUT_SECS))
    }
}
