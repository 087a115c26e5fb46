// ==========================================
// 机组部件追踪系统 - 机组数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 读写函数同时以 `&Connection` 自由函数形式提供，
//       事务持有方（维护事件处理器）直接传入 `&Transaction` 复用
// ==========================================

use crate::domain::asset::{Engine, EngineModel, SlotQuantities};
use crate::domain::counter::EngineCounters;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_datetime, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ENGINE_COLUMNS: &str = r#"
    engine_id, tenant_id, name, model_id, serial_number, location,
    hours_total, starts_total, in_operation, slot_quantities_json, created_at
"#;

// ==========================================
// 自由函数（可在事务中调用）
// ==========================================

pub fn insert_model(conn: &Connection, model: &EngineModel) -> RepositoryResult<()> {
    conn.execute(
        "INSERT INTO engine_model (model_id, tenant_id, brand, name) VALUES (?1, ?2, ?3, ?4)",
        params![model.model_id, model.tenant_id, model.brand, model.name],
    )?;
    Ok(())
}

pub fn find_model(conn: &Connection, model_id: &str) -> RepositoryResult<Option<EngineModel>> {
    let model = conn
        .query_row(
            "SELECT model_id, tenant_id, brand, name FROM engine_model WHERE model_id = ?1",
            params![model_id],
            |row| {
                Ok(EngineModel {
                    model_id: row.get(0)?,
                    tenant_id: row.get(1)?,
                    brand: row.get(2)?,
                    name: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(model)
}

pub fn insert_engine(conn: &Connection, engine: &Engine) -> RepositoryResult<()> {
    let quantities_json = serde_json::to_string(&engine.slot_quantities)?;
    conn.execute(
        &format!("INSERT INTO engine ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)", ENGINE_COLUMNS),
        params![
            engine.engine_id,
            engine.tenant_id,
            engine.name,
            engine.model_id,
            engine.serial_number,
            engine.location,
            engine.hours_total,
            engine.starts_total,
            engine.in_operation,
            quantities_json,
            format_datetime(engine.created_at),
        ],
    )?;
    Ok(())
}

pub fn find_engine(conn: &Connection, engine_id: &str) -> RepositoryResult<Option<Engine>> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM engine WHERE engine_id = ?1", ENGINE_COLUMNS),
            params![engine_id],
            map_engine_row,
        )
        .optional()?;
    raw.map(EngineRow::into_engine).transpose()
}

pub fn list_engines_by_tenant(conn: &Connection, tenant_id: &str) -> RepositoryResult<Vec<Engine>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM engine WHERE tenant_id = ?1 ORDER BY name ASC",
        ENGINE_COLUMNS
    ))?;
    let rows = stmt
        .query_map(params![tenant_id], map_engine_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(EngineRow::into_engine).collect()
}

/// 计数器棘轮: 单条 UPDATE 内取 MAX，不做先读后写
///
/// `starts` 为 None 时启动次数不变
pub fn ratchet_counters(
    conn: &Connection,
    engine_id: &str,
    hours: i64,
    starts: Option<i64>,
) -> RepositoryResult<EngineCounters> {
    let updated = conn.execute(
        r#"
        UPDATE engine
        SET hours_total = MAX(hours_total, ?2),
            starts_total = CASE WHEN ?3 IS NULL THEN starts_total ELSE MAX(starts_total, ?3) END
        WHERE engine_id = ?1
        "#,
        params![engine_id, hours, starts],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("Engine", engine_id));
    }
    read_counters(conn, engine_id)
}

pub fn read_counters(conn: &Connection, engine_id: &str) -> RepositoryResult<EngineCounters> {
    conn.query_row(
        "SELECT hours_total, starts_total FROM engine WHERE engine_id = ?1",
        params![engine_id],
        |row| Ok(EngineCounters::new(row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or_else(|| RepositoryError::not_found("Engine", engine_id))
}

// ==========================================
// 行映射
// ==========================================

struct EngineRow {
    engine: Engine,
    quantities_json: String,
}

impl EngineRow {
    fn into_engine(self) -> RepositoryResult<Engine> {
        let mut engine = self.engine;
        engine.slot_quantities = serde_json::from_str(&self.quantities_json)?;
        Ok(engine)
    }
}

fn map_engine_row(row: &Row<'_>) -> rusqlite::Result<EngineRow> {
    Ok(EngineRow {
        engine: Engine {
            engine_id: row.get(0)?,
            tenant_id: row.get(1)?,
            name: row.get(2)?,
            model_id: row.get(3)?,
            serial_number: row.get(4)?,
            location: row.get(5)?,
            hours_total: row.get(6)?,
            starts_total: row.get(7)?,
            in_operation: row.get(8)?,
            slot_quantities: SlotQuantities::default(),
            created_at: parse_datetime(10, &row.get::<_, String>(10)?)?,
        },
        quantities_json: row.get(9)?,
    })
}

// ==========================================
// EngineRepository - 机组仓储
// ==========================================
/// 机组仓储
/// 职责: 管理 engine_model / engine 表
pub struct EngineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EngineRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create_model(&self, model: &EngineModel) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_model(&conn, model)
    }

    pub fn find_model_by_id(&self, model_id: &str) -> RepositoryResult<Option<EngineModel>> {
        let conn = self.get_conn()?;
        find_model(&conn, model_id)
    }

    pub fn find_by_id(&self, engine_id: &str) -> RepositoryResult<Option<Engine>> {
        let conn = self.get_conn()?;
        find_engine(&conn, engine_id)
    }

    pub fn list_by_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<Engine>> {
        let conn = self.get_conn()?;
        list_engines_by_tenant(&conn, tenant_id)
    }

    /// 推进计数器（棘轮），返回更新后的计数器
    pub fn ratchet_counters(
        &self,
        engine_id: &str,
        hours: i64,
        starts: Option<i64>,
    ) -> RepositoryResult<EngineCounters> {
        let conn = self.get_conn()?;
        ratchet_counters(&conn, engine_id, hours, starts)
    }
}
