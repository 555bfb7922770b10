// ==========================================
// 自动化模板目录系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，保证各入口 schema 一致
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化目录 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS template (
            id               TEXT PRIMARY KEY,
            slug             TEXT NOT NULL UNIQUE,
            title            TEXT NOT NULL,
            description      TEXT,
            platform         TEXT NOT NULL,
            author_name      TEXT,
            author_email     TEXT,
            tutorial_url     TEXT,
            preview_image_url TEXT,
            download_url     TEXT,
            json_url         TEXT,
            language         TEXT NOT NULL DEFAULT 'pt-BR',
            status           TEXT NOT NULL DEFAULT 'draft',
            rating_avg       REAL,
            downloads_count  INTEGER NOT NULL DEFAULT 0,
            tags             TEXT,
            notes            TEXT,
            external_id      TEXT,
            categories_json  TEXT NOT NULL DEFAULT '[]',
            tools_json       TEXT NOT NULL DEFAULT '[]',
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_template_status    ON template(status);
        CREATE INDEX IF NOT EXISTS idx_template_platform  ON template(platform);
        CREATE INDEX IF NOT EXISTS idx_template_downloads ON template(downloads_count);

        CREATE TABLE IF NOT EXISTS category (
            key  TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tool (
            key  TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
    )
}

/// 默认数据库路径（数据目录下 flowlib-catalog/catalog.db）
///
/// 可用环境变量 FLOWLIB_DB 覆盖。
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var("FLOWLIB_DB") {
        return path;
    }
    let mut dir: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("flowlib-catalog");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(error = %e, "无法创建数据目录，回退到当前目录");
        return "catalog.db".to_string();
    }
    dir.push("catalog.db");
    dir.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // 重复执行不报错

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM template", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
