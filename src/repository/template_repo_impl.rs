// ==========================================
// 自动化模板目录系统 - 模板 Repository 实现
// ==========================================
// 存储: SQLite（rusqlite）
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================
// categories / tools 以 JSON 数组存入 TEXT 列，读写经 serde_json。
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::template::{Category, Template, TemplateQuery, Tool};
use crate::domain::types::TemplateStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::template_repo::{FacetField, TemplateRepository};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

// ==========================================
// TemplateRepositoryImpl
// ==========================================
pub struct TemplateRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

const TEMPLATE_COLUMNS: &str = "id, slug, title, description, platform, author_name, \
     author_email, tutorial_url, preview_image_url, download_url, json_url, language, \
     status, rating_avg, downloads_count, tags, notes, external_id, categories_json, \
     tools_json, created_at, updated_at";

impl TemplateRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行 → Template 映射（列顺序与 TEMPLATE_COLUMNS 对齐）
    fn row_to_template(row: &Row<'_>) -> rusqlite::Result<Template> {
        let status_raw: String = row.get(12)?;
        let categories_json: String = row.get(18)?;
        let tools_json: String = row.get(19)?;

        Ok(Template {
            id: row.get(0)?,
            slug: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            platform: row.get(4)?,
            author_name: row.get(5)?,
            author_email: row.get(6)?,
            tutorial_url: row.get(7)?,
            preview_image_url: row.get(8)?,
            download_url: row.get(9)?,
            json_url: row.get(10)?,
            language: row.get(11)?,
            status: TemplateStatus::parse(&status_raw).unwrap_or(TemplateStatus::Draft),
            rating_avg: row.get(13)?,
            downloads_count: row.get(14)?,
            tags: row.get(15)?,
            notes: row.get(16)?,
            external_id: row.get(17)?,
            categories: serde_json::from_str(&categories_json).unwrap_or_default(),
            tools: serde_json::from_str(&tools_json).unwrap_or_default(),
            created_at: row.get(20)?,
            updated_at: row.get(21)?,
        })
    }

    /// 条件查询共用实现（SQL 过滤 + 内存侧 JSON 键过滤，分页最后应用）
    fn query_templates(
        &self,
        query: &TemplateQuery,
        apply_paging: bool,
    ) -> RepositoryResult<Vec<Template>> {
        let conn = self.lock()?;

        let mut sql = format!(
            "SELECT {} FROM template WHERE 1=1",
            TEMPLATE_COLUMNS
        );
        let mut sql_params: Vec<String> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            sql_params.push(status.to_string());
        }
        if let Some(platform) = &query.platform {
            sql.push_str(" AND platform = ?");
            sql_params.push(platform.clone());
        }
        if let Some(search) = &query.search {
            sql.push_str(" AND (LOWER(title) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ?)");
            let pattern = format!("%{}%", search.to_lowercase());
            sql_params.push(pattern.clone());
            sql_params.push(pattern);
        }
        sql.push_str(" ORDER BY downloads_count DESC, slug ASC");

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(sql_params.iter()))?;

        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(Self::row_to_template(row)?);
        }
        drop(rows);
        drop(stmt);

        // 分类/工具为 JSON 键集合，包含判断在内存侧完成
        if let Some(category) = &query.category {
            templates.retain(|t| t.categories.iter().any(|c| c == category));
        }
        if let Some(tool) = &query.tool {
            templates.retain(|t| t.tools.iter().any(|c| c == tool));
        }

        if apply_paging {
            let templates: Vec<Template> = templates
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .collect();
            return Ok(templates);
        }
        Ok(templates)
    }
}

#[async_trait]
impl TemplateRepository for TemplateRepositoryImpl {
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Template>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM template WHERE slug = ?1", TEMPLATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![slug])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_template(row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_by_slug(&self, slug: &str, template: &Template) -> RepositoryResult<()> {
        let categories_json = serde_json::to_string(&template.categories)?;
        let tools_json = serde_json::to_string(&template.tools)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO template (
                id, slug, title, description, platform, author_name, author_email,
                tutorial_url, preview_image_url, download_url, json_url, language,
                status, rating_avg, downloads_count, tags, notes, external_id,
                categories_json, tools_json, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
            )
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                platform = excluded.platform,
                author_name = excluded.author_name,
                author_email = excluded.author_email,
                tutorial_url = excluded.tutorial_url,
                preview_image_url = excluded.preview_image_url,
                download_url = excluded.download_url,
                json_url = excluded.json_url,
                language = excluded.language,
                status = excluded.status,
                rating_avg = excluded.rating_avg,
                downloads_count = excluded.downloads_count,
                tags = excluded.tags,
                notes = excluded.notes,
                external_id = excluded.external_id,
                categories_json = excluded.categories_json,
                tools_json = excluded.tools_json,
                updated_at = excluded.updated_at
            "#,
            params![
                template.id,
                slug,
                template.title,
                template.description,
                template.platform,
                template.author_name,
                template.author_email,
                template.tutorial_url,
                template.preview_image_url,
                template.download_url,
                template.json_url,
                template.language,
                template.status.to_string(),
                template.rating_avg,
                template.downloads_count,
                template.tags,
                template.notes,
                template.external_id,
                categories_json,
                tools_json,
                template.created_at,
                template.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn delete_by_slug(&self, slug: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM template WHERE slug = ?1", params![slug])?;
        Ok(affected > 0)
    }

    async fn list_distinct_values(
        &self,
        field: FacetField,
        published_only: bool,
    ) -> RepositoryResult<Vec<String>> {
        match field {
            FacetField::Platform | FacetField::Language | FacetField::Status => {
                let conn = self.lock()?;
                let mut sql = format!("SELECT DISTINCT {} FROM template", field);
                if published_only {
                    sql.push_str(" WHERE status = 'published'");
                }
                sql.push_str(" ORDER BY 1");

                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query([])?;
                let mut values = Vec::new();
                while let Some(row) = rows.next()? {
                    values.push(row.get::<_, String>(0)?);
                }
                Ok(values)
            }
            FacetField::Category | FacetField::Tool => {
                // JSON 键集合需整行扫描后在内存侧汇总
                let query = TemplateQuery {
                    status: if published_only {
                        Some(TemplateStatus::Published)
                    } else {
                        None
                    },
                    ..TemplateQuery::default()
                };
                let templates = self.query_templates(&query, false)?;
                let mut keys = BTreeSet::new();
                for t in templates {
                    let source = if field == FacetField::Category {
                        &t.categories
                    } else {
                        &t.tools
                    };
                    keys.extend(source.iter().cloned());
                }
                Ok(keys.into_iter().collect())
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Template>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM template WHERE id = ?1", TEMPLATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_template(row)?)),
            None => Ok(None),
        }
    }

    async fn list_templates(&self, query: &TemplateQuery) -> RepositoryResult<Vec<Template>> {
        self.query_templates(query, true)
    }

    async fn count_templates(&self, query: &TemplateQuery) -> RepositoryResult<usize> {
        Ok(self.query_templates(query, false)?.len())
    }

    async fn list_featured(&self, limit: usize) -> RepositoryResult<Vec<Template>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM template WHERE status = 'published' \
             ORDER BY rating_avg DESC NULLS LAST, downloads_count DESC LIMIT ?1",
            TEMPLATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![limit as i64])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(Self::row_to_template(row)?);
        }
        Ok(templates)
    }

    async fn increment_downloads(&self, id: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE template SET downloads_count = downloads_count + 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(affected > 0)
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, name FROM category ORDER BY key")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                key: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(categories)
    }

    async fn list_tools(&self) -> RepositoryResult<Vec<Tool>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, name FROM tool ORDER BY key")?;
        let mut rows = stmt.query([])?;
        let mut tools = Vec::new();
        while let Some(row) = rows.next()? {
            tools.push(Tool {
                key: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(tools)
    }

    async fn count_all(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM template", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, TemplateRepositoryImpl) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        {
            let conn = open_sqlite_connection(&path).unwrap();
            crate::db::init_schema(&conn).unwrap();
        }
        let repo = TemplateRepositoryImpl::new(&path).unwrap();
        (file, repo)
    }

    fn template(slug: &str, platform: &str, downloads: i64) -> Template {
        let now = Utc::now();
        Template {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            title: format!("Template {}", slug),
            description: Some("descrição".to_string()),
            platform: platform.to_string(),
            author_name: None,
            author_email: None,
            tutorial_url: None,
            preview_image_url: None,
            download_url: None,
            json_url: None,
            language: "pt-BR".to_string(),
            status: TemplateStatus::Published,
            rating_avg: Some(4.0),
            downloads_count: downloads,
            tags: None,
            notes: None,
            external_id: None,
            categories: vec!["marketing".to_string()],
            tools: vec!["openai".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find_roundtrip() {
        let (_file, repo) = setup();
        let t = template("demo-1", "n8n", 10);
        repo.upsert_by_slug("demo-1", &t).await.unwrap();

        let found = repo.find_by_slug("demo-1").await.unwrap().unwrap();
        assert_eq!(found.id, t.id);
        assert_eq!(found.categories, vec!["marketing"]);
        assert_eq!(found.status, TemplateStatus::Published);
    }

    #[tokio::test]
    async fn test_upsert_replaces_without_new_row() {
        let (_file, repo) = setup();
        let t = template("demo-1", "n8n", 10);
        repo.upsert_by_slug("demo-1", &t).await.unwrap();

        let mut t2 = template("demo-1", "make", 20);
        t2.id = t.id.clone(); // 对账器保证 id 不变
        repo.upsert_by_slug("demo-1", &t2).await.unwrap();

        assert_eq!(repo.count_all().await.unwrap(), 1);
        let found = repo.find_by_slug("demo-1").await.unwrap().unwrap();
        assert_eq!(found.platform, "make");
        assert_eq!(found.downloads_count, 20);
    }

    #[tokio::test]
    async fn test_delete_by_slug_reports_absence() {
        let (_file, repo) = setup();
        let t = template("demo-1", "n8n", 10);
        repo.upsert_by_slug("demo-1", &t).await.unwrap();

        assert!(repo.delete_by_slug("demo-1").await.unwrap());
        assert!(!repo.delete_by_slug("demo-1").await.unwrap());
        assert!(repo.find_by_slug("demo-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_templates_filters_and_ordering() {
        let (_file, repo) = setup();
        repo.upsert_by_slug("a-1", &template("a-1", "n8n", 5))
            .await
            .unwrap();
        repo.upsert_by_slug("a-2", &template("a-2", "n8n", 50))
            .await
            .unwrap();
        repo.upsert_by_slug("b-1", &template("b-1", "make", 30))
            .await
            .unwrap();

        let query = TemplateQuery {
            platform: Some("n8n".to_string()),
            ..TemplateQuery::default()
        };
        let result = repo.list_templates(&query).await.unwrap();
        assert_eq!(result.len(), 2);
        // 下载量倒序
        assert_eq!(result[0].slug, "a-2");

        let query = TemplateQuery {
            category: Some("marketing".to_string()),
            ..TemplateQuery::default()
        };
        assert_eq!(repo.count_templates(&query).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_distinct_platforms() {
        let (_file, repo) = setup();
        repo.upsert_by_slug("a-1", &template("a-1", "n8n", 5))
            .await
            .unwrap();
        repo.upsert_by_slug("b-1", &template("b-1", "make", 30))
            .await
            .unwrap();

        let platforms = repo
            .list_distinct_values(FacetField::Platform, true)
            .await
            .unwrap();
        assert_eq!(platforms, vec!["make".to_string(), "n8n".to_string()]);
    }

    #[tokio::test]
    async fn test_increment_downloads() {
        let (_file, repo) = setup();
        let t = template("demo-1", "n8n", 10);
        repo.upsert_by_slug("demo-1", &t).await.unwrap();

        assert!(repo.increment_downloads(&t.id).await.unwrap());
        assert!(!repo.increment_downloads("missing-id").await.unwrap());

        let found = repo.find_by_slug("demo-1").await.unwrap().unwrap();
        assert_eq!(found.downloads_count, 11);
    }
}
