// ==========================================
// 自动化模板目录系统 - 模板 Repository Trait
// ==========================================
// 职责: 定义模板数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================
// 导入核心只依赖 find/upsert/delete 三个按键操作，
// 其余查询服务于目录浏览接口。
// ==========================================

use crate::domain::template::{Category, Template, TemplateQuery, Tool};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::fmt;

// ==========================================
// FacetField - 可做去重汇总的字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetField {
    Platform,
    Language,
    Status,
    Category,
    Tool,
}

impl fmt::Display for FacetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetField::Platform => write!(f, "platform"),
            FacetField::Language => write!(f, "language"),
            FacetField::Status => write!(f, "status"),
            FacetField::Category => write!(f, "categories"),
            FacetField::Tool => write!(f, "tools"),
        }
    }
}

// ==========================================
// TemplateRepository Trait
// ==========================================
// 用途: 模板目录数据访问
// 实现者: TemplateRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    // ===== 按唯一键操作（导入核心的全部依赖）=====

    /// 按 slug 查找模板
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Template>>;

    /// 按 slug 写入模板（不存在则插入，存在则全量替换可变字段）
    ///
    /// # 说明
    /// - 单行粒度事务: 一行一写，无跨行事务
    /// - id / slug / created_at 由调用方载荷携带，本层不改写
    async fn upsert_by_slug(&self, slug: &str, template: &Template) -> RepositoryResult<()>;

    /// 按 slug 删除模板
    ///
    /// # 返回
    /// - Ok(true): 确有记录被删除
    /// - Ok(false): 目标不存在
    async fn delete_by_slug(&self, slug: &str) -> RepositoryResult<bool>;

    /// 字段去重取值（分面汇总）
    ///
    /// # 参数
    /// - field: 汇总字段
    /// - published_only: 是否仅统计已发布模板
    async fn list_distinct_values(
        &self,
        field: FacetField,
        published_only: bool,
    ) -> RepositoryResult<Vec<String>>;

    // ===== 目录浏览查询 =====

    /// 按内部 id 查找模板
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Template>>;

    /// 条件查询（平台/分类/工具/搜索词过滤，按下载量倒序，带分页）
    async fn list_templates(&self, query: &TemplateQuery) -> RepositoryResult<Vec<Template>>;

    /// 条件查询命中总数（忽略分页）
    async fn count_templates(&self, query: &TemplateQuery) -> RepositoryResult<usize>;

    /// 精选模板（已发布，按评分倒序）
    async fn list_featured(&self, limit: usize) -> RepositoryResult<Vec<Template>>;

    /// 下载计数 +1
    ///
    /// # 返回
    /// - Ok(true): 目标存在且已累加
    /// - Ok(false): 目标不存在
    async fn increment_downloads(&self, id: &str) -> RepositoryResult<bool>;

    // ===== 字典数据 =====

    /// 全部分类
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;

    /// 全部工具
    async fn list_tools(&self) -> RepositoryResult<Vec<Tool>>;

    /// 模板总数（不过滤）
    async fn count_all(&self) -> RepositoryResult<usize>;
}
