// ==========================================
// 自动化模板目录系统 - 模板领域模型
// ==========================================
// 职责: 定义目录主实体与导入管道的中间结构
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::types::{RowAction, RowStatus, TemplateStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Template - 模板主数据
// ==========================================
// 用途: 导入层写入，浏览接口只读
// 约束: slug 全局唯一，创建后不可变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    // ===== 标识 =====
    pub id: String,   // 内部标识（UUID，插入时生成）
    pub slug: String, // 唯一标识（小写字母/数字/连字符/下划线，≥2 字符）

    // ===== 基础信息 =====
    pub title: String,
    pub description: Option<String>,
    pub platform: String, // 所属自动化平台（缺省时由配置回填）

    // ===== 作者信息 =====
    pub author_name: Option<String>,
    pub author_email: Option<String>,

    // ===== 外部链接 =====
    pub tutorial_url: Option<String>,
    pub preview_image_url: Option<String>,
    pub download_url: Option<String>,
    pub json_url: Option<String>,

    // ===== 展示属性 =====
    pub language: String,           // 语言代码（默认 pt-BR）
    pub status: TemplateStatus,     // 生命周期状态
    pub rating_avg: Option<f64>,    // 平均评分，存在时必在 [0, 5] 内
    pub downloads_count: i64,       // 下载次数，恒 >= 0

    // ===== 附加信息 =====
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub external_id: Option<String>,

    // ===== 关联键集合（顺序无关）=====
    pub categories: Vec<String>, // 分类键
    pub tools: Vec<String>,      // 工具键

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 插入时设定，更新时保留
    pub updated_at: DateTime<Utc>, // 每次成功 upsert 刷新
}

// ==========================================
// Category / Tool - 分面查找实体
// ==========================================
// 用途: 过滤 UI 的字典数据，核心管道只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub key: String, // 主键（如 "marketing"）
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub key: String, // 主键（如 "openai"）
    pub name: String,
}

// ==========================================
// RawTemplateRecord - 导入中间结构体
// ==========================================
// 用途: 修正器输出的"已清洗行"（解析 → 修正 → 此结构）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTemplateRecord {
    pub slug: String, // 空字符串表示缺失（由对账器拦截）
    pub title: String,
    pub description: Option<String>,
    pub platform: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub tutorial_url: Option<String>,
    pub preview_image_url: Option<String>,
    pub download_url: Option<String>,
    pub json_url: Option<String>,
    pub language: String,
    pub status: TemplateStatus,
    pub rating_avg: Option<f64>,
    pub downloads_count: Option<i64>, // None 表示列缺失（更新时保留原值）
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub external_id: Option<String>,
    pub categories: Vec<String>,
    pub tools: Vec<String>,

    // 元信息
    pub line_number: usize, // 源文件行号（表头为第 1 行，首条数据为第 2 行）
}

// ==========================================
// AppliedFix - 自动修正记录
// ==========================================
// 每条非阻断修正一条记录，预览输出据此保持可追溯
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedFix {
    pub field: String,
    pub original: String,
    pub corrected: String,
}

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
// 预览模式返回全部 RowOutcome；提交模式仅据其汇总计数与错误
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowOutcome {
    pub line_number: usize,
    pub status: RowStatus,
    pub action: Option<RowAction>, // None 表示 action 列无法识别
    pub slug: String,
    pub title: String,
    pub message: String,
    pub fixes: Vec<AppliedFix>,
    /// 将要写入（或假设写入）的完整载荷。
    /// 预览模式下即使该行为 error，upsert 路径也会携带修正后的假设载荷。
    pub data: Option<Template>,
}

// ==========================================
// ImportReport - 提交模式报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// 按源文件顺序排列，每条带 "行 N:" 前缀
    pub errors: Vec<String>,
}

// ==========================================
// PreviewReport - 预览模式报告
// ==========================================
// 信息上是 ImportReport 的超集；不变量:
// insert + update + delete + error == total_rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewReport {
    pub total_rows: usize,
    pub insert_count: usize,
    pub update_count: usize,
    pub delete_count: usize,
    pub error_count: usize,
    pub rows: Vec<RowOutcome>,
}

// ==========================================
// TemplateQuery - 目录浏览查询条件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateQuery {
    pub platform: Option<String>,
    pub category: Option<String>, // 分类键
    pub tool: Option<String>,     // 工具键
    pub search: Option<String>,   // 标题/描述子串（不区分大小写）
    pub status: Option<TemplateStatus>, // None 表示不过滤状态
    pub limit: usize,
    pub offset: usize,
}

impl Default for TemplateQuery {
    fn default() -> Self {
        Self {
            platform: None,
            category: None,
            tool: None,
            search: None,
            status: Some(TemplateStatus::Published),
            limit: 50,
            offset: 0,
        }
    }
}
