// ==========================================
// 自动化模板目录系统 - 模板浏览 API
// ==========================================
// 职责: 目录浏览、分面汇总、精选与下载计数
// 说明: 读侧接口，与导入核心共用同一仓储
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::template::{Category, Template, TemplateQuery, Tool};
use crate::repository::{FacetField, TemplateRepository, TemplateRepositoryImpl};
use tracing::debug;

/// 单次查询返回的最大条数
const MAX_PAGE_SIZE: usize = 100;

/// 精选列表默认条数
const DEFAULT_FEATURED_LIMIT: usize = 6;

/// 模板浏览 API
pub struct TemplateApi {
    db_path: String,
}

impl TemplateApi {
    /// 创建新的 TemplateApi 实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    fn repo(&self) -> ApiResult<TemplateRepositoryImpl> {
        TemplateRepositoryImpl::new(&self.db_path)
            .map_err(|e| ApiError::DatabaseError(format!("创建仓储失败: {}", e)))
    }

    /// 条件查询模板列表
    ///
    /// # 说明
    /// - 默认仅返回已发布模板，按下载量倒序
    /// - limit 钳制到 1..=100
    pub async fn list_templates(&self, mut query: TemplateQuery) -> ApiResult<Vec<Template>> {
        query.limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        let repo = self.repo()?;
        let templates = repo.list_templates(&query).await?;
        debug!(count = templates.len(), "模板列表查询完成");
        Ok(templates)
    }

    /// 条件查询命中总数（分页 UI 用）
    pub async fn count_templates(&self, query: &TemplateQuery) -> ApiResult<usize> {
        Ok(self.repo()?.count_templates(query).await?)
    }

    /// 按内部 id 获取模板
    pub async fn get_template(&self, id: &str) -> ApiResult<Template> {
        self.repo()?
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("模板不存在: {}", id)))
    }

    /// 按 slug 获取模板
    pub async fn get_template_by_slug(&self, slug: &str) -> ApiResult<Template> {
        self.repo()?
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("模板不存在: {}", slug)))
    }

    /// 全部分类（字典数据）
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.repo()?.list_categories().await?)
    }

    /// 全部工具（字典数据）
    pub async fn list_tools(&self) -> ApiResult<Vec<Tool>> {
        Ok(self.repo()?.list_tools().await?)
    }

    /// 已发布模板的平台分面（去重取值）
    pub async fn list_platform_facets(&self) -> ApiResult<Vec<String>> {
        Ok(self
            .repo()?
            .list_distinct_values(FacetField::Platform, true)
            .await?)
    }

    /// 精选模板（已发布，按评分倒序）
    pub async fn featured(&self, limit: Option<usize>) -> ApiResult<Vec<Template>> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_PAGE_SIZE);
        Ok(self.repo()?.list_featured(limit).await?)
    }

    /// 记录一次下载（计数 +1）
    pub async fn register_download(&self, id: &str) -> ApiResult<()> {
        let updated = self.repo()?.increment_downloads(id).await?;
        if !updated {
            return Err(ApiError::NotFound(format!("模板不存在: {}", id)));
        }
        Ok(())
    }
}
