// ==========================================
// 自动化模板目录系统 - 表格数据源适配器
// ==========================================
// 职责: 数据源裁决（文件 / 表格链接二选一）、
//       表格链接改写为 CSV 导出地址并抓取、
//       CSV 文本解析为有序行映射（含表头契约与列回填）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::template_importer_trait::TabularParser;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// 表头缺失时按列回填空串的可选列
const BACKFILLED_COLUMNS: &[&str] = &[
    "title",
    "platform",
    "status",
    "description",
    "author_name",
    "categories",
    "tools",
    "rating_avg",
    "downloads_count",
];

/// 表格抓取默认超时（秒）
pub const DEFAULT_SHEET_FETCH_TIMEOUT_SECS: u64 = 30;

// ==========================================
// ImportSource - 导入数据源
// ==========================================
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// 本地上传的 CSV 文件（文件名 + 原始字节）
    File { name: String, bytes: Vec<u8> },
    /// Google Sheets 链接（需可公开读取）
    SheetUrl(String),
}

impl ImportSource {
    /// 数据源裁决: 文件与链接必须恰好提供一个
    ///
    /// # 返回
    /// - Err(MissingSource): 两者皆缺
    /// - Err(AmbiguousSource): 两者皆有
    pub fn from_parts(
        file: Option<(String, Vec<u8>)>,
        sheet_url: Option<String>,
    ) -> ImportResult<Self> {
        match (file, sheet_url) {
            (Some((name, bytes)), None) => Ok(ImportSource::File { name, bytes }),
            (None, Some(url)) => Ok(ImportSource::SheetUrl(url)),
            (None, None) => Err(ImportError::MissingSource),
            (Some(_), Some(_)) => Err(ImportError::AmbiguousSource),
        }
    }
}

// ==========================================
// 表格链接改写
// ==========================================

/// 将 Google Sheets 链接改写为 CSV 导出地址
///
/// # 识别范围
/// - 仅接受 docs.google.com/spreadsheets 族
/// - `/d/<id>/edit...` 与裸 `/d/<id>` 两种路径均可提取表格 ID
/// - query 或 fragment 中的 gid 参数透传（保持非首个工作表可用）
pub fn sheet_to_csv_export_url(raw: &str) -> ImportResult<String> {
    let parsed =
        Url::parse(raw).map_err(|_| ImportError::InvalidSheetUrl(raw.to_string()))?;

    if parsed.host_str() != Some("docs.google.com")
        || !parsed.path().starts_with("/spreadsheets/")
    {
        return Err(ImportError::InvalidSheetUrl(raw.to_string()));
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    let sheet_id = segments
        .iter()
        .position(|&seg| seg == "d")
        .and_then(|pos| segments.get(pos + 1))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ImportError::InvalidSheetUrl(raw.to_string()))?;

    // gid 可能出现在 query（?gid=N）或 fragment（#gid=N）
    let gid = parsed
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.to_string())
        .or_else(|| {
            parsed
                .fragment()
                .and_then(|f| f.strip_prefix("gid="))
                .map(str::to_string)
        });

    let mut export = format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
        sheet_id
    );
    if let Some(gid) = gid {
        export.push_str(&format!("&gid={}", gid));
    }
    Ok(export)
}

// ==========================================
// SourceResolver - 数据源解析器
// ==========================================
// 将任一数据源归一为 UTF-8 CSV 文本；抓取是管道中唯一的网络操作
pub struct SourceResolver {
    fetch_timeout: Duration,
}

impl SourceResolver {
    pub fn new(fetch_timeout_secs: u64) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        }
    }

    /// # 返回
    /// - Ok(String): CSV 文本
    /// - Err(ImportError): 源级失败（任何行被处理前中止）
    pub async fn resolve(&self, source: &ImportSource) -> ImportResult<String> {
        match source {
            ImportSource::File { name, bytes } => {
                if !name.to_lowercase().ends_with(".csv") {
                    return Err(ImportError::UnsupportedFormat(name.clone()));
                }
                let text = String::from_utf8(bytes.clone())
                    .map_err(|e| ImportError::EncodingError(e.to_string()))?;
                if text.trim().is_empty() {
                    return Err(ImportError::EmptyContent);
                }
                debug!(file = %name, bytes = bytes.len(), "本地 CSV 文件解码完成");
                Ok(text)
            }
            ImportSource::SheetUrl(raw_url) => {
                let export_url = sheet_to_csv_export_url(raw_url)?;
                info!(url = %export_url, "抓取表格 CSV 导出");

                let client = reqwest::Client::builder()
                    .timeout(self.fetch_timeout)
                    .build()?;
                let response = client.get(&export_url).send().await?;
                let response = response
                    .error_for_status()
                    .map_err(|e| ImportError::SheetFetchError(e.to_string()))?;
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Err(ImportError::EmptyContent);
                }
                Ok(text)
            }
        }
    }
}

// ==========================================
// CsvParser - CSV 文本解析器
// ==========================================
pub struct CsvParser;

impl TabularParser for CsvParser {
    fn parse_rows(&self, text: &str) -> ImportResult<Vec<(usize, HashMap<String, String>)>> {
        if text.trim().is_empty() {
            return Err(ImportError::EmptyContent);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // ===== 表头契约（列名区分大小写）=====
        if !headers.iter().any(|h| h == "action") {
            return Err(ImportError::MissingColumn("action".to_string()));
        }
        let has_slug = headers.iter().any(|h| h == "slug");
        let has_key = headers.iter().any(|h| h == "key");
        if !has_slug && !has_key {
            return Err(ImportError::MissingColumn("slug（或 key）".to_string()));
        }

        let missing_columns: Vec<&str> = BACKFILLED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let line_number = idx + 2; // 表头占第 1 行
            let record = result?;

            let mut row_map = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行（行号不受影响，始终对齐源文件）
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            // key 别名为 slug
            if !has_slug {
                let key_value = row_map.get("key").cloned().unwrap_or_default();
                row_map.insert("slug".to_string(), key_value);
            }

            // 缺失的可选列按列回填
            for col in &missing_columns {
                row_map.entry(col.to_string()).or_default();
            }

            rows.push((line_number, row_map));
        }

        Ok(rows)
    }
}
