// ==========================================
// 自动化模板目录系统 - CLI 主入口
// ==========================================
// 用途: 本地运维入口（建库 / 导入 / 预览 / 浏览）
// 传输层 shell（HTTP 等）在仓库外，另行接入 API 层
// ==========================================

use flowlib_catalog::api::{ImportApi, TemplateApi};
use flowlib_catalog::db;
use flowlib_catalog::domain::template::TemplateQuery;
use flowlib_catalog::logging;

fn print_usage() {
    eprintln!("用法:");
    eprintln!("  flowlib-catalog init");
    eprintln!("  flowlib-catalog preview <file.csv>");
    eprintln!("  flowlib-catalog preview --sheet-url <url>");
    eprintln!("  flowlib-catalog import <file.csv> [file2.csv ...]");
    eprintln!("  flowlib-catalog import --sheet-url <url>");
    eprintln!("  flowlib-catalog list");
    eprintln!();
    eprintln!("环境变量:");
    eprintln!("  FLOWLIB_DB   数据库文件路径（默认: 数据目录下 flowlib-catalog/catalog.db）");
}

/// 解析 `--sheet-url <url>` 或文件参数
fn split_source_args(args: &[String]) -> (Option<String>, Vec<String>) {
    if args.first().map(String::as_str) == Some("--sheet-url") {
        (args.get(1).cloned(), Vec::new())
    } else {
        (None, args.to_vec())
    }
}

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    let db_path = db::default_db_path();
    tracing::info!("{} {}", flowlib_catalog::APP_NAME, flowlib_catalog::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    let exit_code = match command {
        "init" => cmd_init(&db_path),
        "preview" => cmd_preview(&db_path, &args[1..]).await,
        "import" => cmd_import(&db_path, &args[1..]).await,
        "list" => cmd_list(&db_path).await,
        _ => {
            print_usage();
            2
        }
    };

    std::process::exit(exit_code);
}

fn cmd_init(db_path: &str) -> i32 {
    match db::open_sqlite_connection(db_path).and_then(|conn| db::init_schema(&conn)) {
        Ok(()) => {
            println!("数据库初始化完成: {}", db_path);
            0
        }
        Err(e) => {
            eprintln!("数据库初始化失败: {}", e);
            1
        }
    }
}

async fn cmd_preview(db_path: &str, args: &[String]) -> i32 {
    let (sheet_url, files) = split_source_args(args);
    let file = match (sheet_url.as_ref(), files.first()) {
        (None, Some(path)) => match std::fs::read(path) {
            Ok(bytes) => Some((path.clone(), bytes)),
            Err(e) => {
                eprintln!("文件读取失败 {}: {}", path, e);
                return 1;
            }
        },
        _ => None,
    };

    let api = ImportApi::new(db_path.to_string());
    match api.run_preview(file, sheet_url).await {
        Ok(report) => {
            println!(
                "预览完成: 共 {} 行 | 新增 {} | 更新 {} | 删除 {} | 错误 {}",
                report.total_rows,
                report.insert_count,
                report.update_count,
                report.delete_count,
                report.error_count
            );
            for row in &report.rows {
                println!(
                    "  行 {:<4} {:<7} {:<30} {}",
                    row.line_number, row.status, row.slug, row.message
                );
            }
            0
        }
        Err(e) => {
            eprintln!("预览失败: {}", e);
            1
        }
    }
}

async fn cmd_import(db_path: &str, args: &[String]) -> i32 {
    let (sheet_url, files) = split_source_args(args);
    let api = ImportApi::new(db_path.to_string());

    // 多文件走批量导入，单文件/链接走单次导入
    if sheet_url.is_none() && files.len() > 1 {
        match api.import_files(files).await {
            Ok(results) => {
                for (idx, result) in results.iter().enumerate() {
                    match result {
                        Ok(r) => println!(
                            "文件 {}: 新增 {} | 更新 {} | 删除 {} | 错误 {}",
                            idx + 1,
                            r.inserted,
                            r.updated,
                            r.deleted,
                            r.errors.len()
                        ),
                        Err(e) => println!("文件 {}: {}", idx + 1, e),
                    }
                }
                0
            }
            Err(e) => {
                eprintln!("批量导入失败: {}", e);
                1
            }
        }
    } else {
        let file = match (sheet_url.as_ref(), files.first()) {
            (None, Some(path)) => match std::fs::read(path) {
                Ok(bytes) => Some((path.clone(), bytes)),
                Err(e) => {
                    eprintln!("文件读取失败 {}: {}", path, e);
                    return 1;
                }
            },
            _ => None,
        };

        match api.run_import(file, sheet_url).await {
            Ok(report) => {
                println!(
                    "导入完成: 新增 {} | 更新 {} | 删除 {} | 错误 {}",
                    report.inserted,
                    report.updated,
                    report.deleted,
                    report.errors.len()
                );
                for error in &report.errors {
                    println!("  {}", error);
                }
                0
            }
            Err(e) => {
                eprintln!("导入失败: {}", e);
                1
            }
        }
    }
}

async fn cmd_list(db_path: &str) -> i32 {
    let api = TemplateApi::new(db_path.to_string());
    match api.list_templates(TemplateQuery::default()).await {
        Ok(templates) => {
            println!("已发布模板 {} 条:", templates.len());
            for t in templates {
                println!(
                    "  {:<30} {:<10} 下载 {:<8} {}",
                    t.slug, t.platform, t.downloads_count, t.title
                );
            }
            0
        }
        Err(e) => {
            eprintln!("查询失败: {}", e);
            1
        }
    }
}
