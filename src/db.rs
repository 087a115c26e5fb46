// ==========================================
// 机组部件追踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 所有连接经由 open_sqlite_connection 打开（外键 + busy_timeout）
// - 建库入口唯一，schema 以 migrations/v0.1_schema.sql 为准
// ==========================================

use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V0_1: &str = include_str!("../migrations/v0.1_schema.sql");

/// 应用统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 都是连接级设置；维护事件的 IMMEDIATE 事务
/// 在多连接下依赖 busy_timeout 排队而不是立即失败
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等，CREATE ... IF NOT EXISTS）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_V0_1)
}

/// 读取 schema_version（未建库时返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .is_some();
    if !has_table {
        return Ok(None);
    }
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
}

/// 初始化并核对 schema 版本
///
/// 版本不一致只告警不迁移（旧库需人工处理）
pub fn prepare_database(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    init_schema(conn)?;
    let version = read_schema_version(conn)?;
    match version {
        Some(v) if v == CURRENT_SCHEMA_VERSION => tracing::info!(schema_version = v, "schema 已就绪"),
        other => tracing::warn!(
            found = ?other,
            expected = CURRENT_SCHEMA_VERSION,
            "schema 版本与代码不一致"
        ),
    }
    Ok(version)
}
