// ==========================================
// 机组部件追踪系统 - 命令行入口
// ==========================================
// 职责: 初始化日志、打开数据库、应用 schema、输出 schema 版本
// 用法: genset-tracker [数据库路径]
// ==========================================

use genset_tracker::app::{get_default_db_path, AppState};
use genset_tracker::db::{open_sqlite_connection, read_schema_version};

fn main() -> anyhow::Result<()> {
    genset_tracker::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", genset_tracker::APP_NAME);
    tracing::info!("系统版本: {}", genset_tracker::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let conn = open_sqlite_connection(&state.db_path)?;
    let version = read_schema_version(&conn)?;
    println!(
        "{} v{} | db={} | schema_version={}",
        genset_tracker::APP_NAME,
        genset_tracker::VERSION,
        state.db_path,
        version.map_or_else(|| "none".to_string(), |v| v.to_string())
    );

    Ok(())
}
