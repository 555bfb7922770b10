// ==========================================
// 自动化模板目录系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::template::{
    AppliedFix, ImportReport, PreviewReport, RawTemplateRecord,
};
use crate::domain::types::{RowAction, TemplateStatus};
use crate::importer::csv_source::ImportSource;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;

// ==========================================
// ImportDefaults - 行级回填默认值
// ==========================================
// 来源: config_kv（经 ImportConfigReader 读取），每次导入读取一次
#[derive(Debug, Clone)]
pub struct ImportDefaults {
    pub platform: String,
    pub language: String,
    pub status: TemplateStatus,
}

// ==========================================
// TemplateImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: TemplateImporterImpl
#[async_trait]
pub trait TemplateImporter: Send + Sync {
    /// 提交模式导入: 逐行写入仓储并返回汇总报告
    ///
    /// # 参数
    /// - source: CSV 文件字节流或表格链接（二选一）
    ///
    /// # 返回
    /// - Ok(ImportReport): 新增/更新/删除计数 + 带行号的错误列表
    /// - Err(ImportError): 源级失败（任何行被处理前中止，不返回报告）
    ///
    /// # 语义
    /// - 行按源文件顺序严格串行处理，后行可观察到前行的写入效果
    /// - 单行失败不中止整批，错误累积到报告
    async fn run_import(&self, source: &ImportSource) -> ImportResult<ImportReport>;

    /// 预览模式（dry-run）: 走与提交完全相同的管道，但不产生任何写入
    ///
    /// # 返回
    /// - Ok(PreviewReport): 总行数、各终态计数、全部逐行结果（含将写入的载荷）
    /// - Err(ImportError): 源级失败
    async fn run_preview(&self, source: &ImportSource) -> ImportResult<PreviewReport>;

    /// 批量导入多个数据源（并发执行）
    ///
    /// # 说明
    /// - 各数据源的导入相互独立，单个失败不影响其他
    /// - 同一数据源内部仍保持逐行串行
    async fn batch_import(
        &self,
        sources: Vec<ImportSource>,
    ) -> ImportResult<Vec<Result<ImportReport, String>>>;
}

// ==========================================
// TabularParser Trait
// ==========================================
// 用途: 表格文本 → 有序行映射（阶段 0）
// 实现者: CsvParser
pub trait TabularParser: Send + Sync {
    /// 解析 CSV 文本为 (行号, 列名 → 值) 序列
    ///
    /// # 约定
    /// - 表头为第 1 行，首条数据行号为 2
    /// - 表头必须含 `action` 列及 `slug`/`key` 之一（key 别名为 slug）
    /// - 缺失的可选列按列回填空串
    /// - 完全空白的行跳过（行号保持与源文件一致）
    fn parse_rows(&self, text: &str) -> ImportResult<Vec<(usize, HashMap<String, String>)>>;
}

// ==========================================
// RowCorrector Trait
// ==========================================
// 用途: 原始行 → 已清洗记录 + 修正清单（阶段 1，永不失败）
// 实现者: RowCorrector
pub trait RowCorrector: Send + Sync {
    /// 纯变换: 不修改输入，返回新的已修正记录
    ///
    /// # 返回
    /// - RawTemplateRecord: 修正后的行
    /// - Vec<AppliedFix>: 实际改写了非空输入值的修正记录
    ///   （空值回填默认值不计入，最终载荷即其可见形式）
    fn correct(
        &self,
        cells: &HashMap<String, String>,
        line_number: usize,
        defaults: &ImportDefaults,
    ) -> (RawTemplateRecord, Vec<AppliedFix>);
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 检查已修正行中剩余的硬错误（阶段 2）
// 实现者: RowValidator（由 ValidationPolicy 驱动）
pub trait RowValidator: Send + Sync {
    /// # 参数
    /// - record: 已修正行
    /// - fixes: 修正器产出的修正清单（strict 策略据此升级为硬错误）
    ///
    /// # 返回
    /// - 硬错误消息列表；非空即阻断该行写入
    fn validate(&self, record: &RawTemplateRecord, fixes: &[AppliedFix]) -> Vec<String>;
}

// ==========================================
// ActionClassifier Trait
// ==========================================
// 用途: action 单元格 → 行操作类型
// 实现者: ActionClassifier
pub trait ActionClassifier: Send + Sync {
    /// # 返回
    /// - Ok(RowAction): upsert / delete
    /// - Err(String): 携带原始非法值的拒绝消息（编排器转为行级错误后继续）
    fn classify(&self, raw: &str) -> Result<RowAction, String>;
}
