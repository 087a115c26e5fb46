// ==========================================
// 机组部件追踪系统 - 维护事件数据仓储
// ==========================================
// 红线: 只追加。本仓储不提供任何 UPDATE / DELETE
// ==========================================

use crate::domain::maintenance::MaintenanceEvent;
use crate::domain::types::TriggerKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_date, format_datetime, parse_date, parse_datetime, parse_enum};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const EVENT_COLUMNS: &str = r#"
    event_id, tenant_id, engine_id, slot_id, event_date, trigger_kind,
    hours_at_execution, starts_at_execution, stock_item_id, quantity_used,
    new_serial, note, responsible, created_at
"#;

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<MaintenanceEvent> {
    Ok(MaintenanceEvent {
        event_id: row.get(0)?,
        tenant_id: row.get(1)?,
        engine_id: row.get(2)?,
        slot_id: row.get(3)?,
        event_date: parse_date(4, &row.get::<_, String>(4)?)?,
        trigger_kind: parse_enum(5, &row.get::<_, String>(5)?, TriggerKind::from_db_str)?,
        hours_at_execution: row.get(6)?,
        starts_at_execution: row.get(7)?,
        stock_item_id: row.get(8)?,
        quantity_used: row.get(9)?,
        new_serial: row.get(10)?,
        note: row.get(11)?,
        responsible: row.get(12)?,
        created_at: parse_datetime(13, &row.get::<_, String>(13)?)?,
    })
}

// ==========================================
// 自由函数（可在事务中调用）
// ==========================================

pub fn insert_event(conn: &Connection, event: &MaintenanceEvent) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO maintenance_event ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            EVENT_COLUMNS
        ),
        params![
            event.event_id,
            event.tenant_id,
            event.engine_id,
            event.slot_id,
            format_date(event.event_date),
            event.trigger_kind.to_db_str(),
            event.hours_at_execution,
            event.starts_at_execution,
            event.stock_item_id,
            event.quantity_used,
            event.new_serial,
            event.note,
            event.responsible,
            format_datetime(event.created_at),
        ],
    )?;
    Ok(())
}

pub fn find_event(conn: &Connection, event_id: &str) -> RepositoryResult<Option<MaintenanceEvent>> {
    let event = conn
        .query_row(
            &format!("SELECT {} FROM maintenance_event WHERE event_id = ?1", EVENT_COLUMNS),
            params![event_id],
            map_event_row,
        )
        .optional()?;
    Ok(event)
}

fn list_events_where(conn: &Connection, column: &str, value: &str) -> RepositoryResult<Vec<MaintenanceEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM maintenance_event WHERE {} = ?1 ORDER BY event_date DESC, created_at DESC, rowid DESC",
        EVENT_COLUMNS, column
    ))?;
    let events = stmt
        .query_map(params![value], map_event_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(events)
}

// ==========================================
// MaintenanceEventRepository - 维护事件仓储
// ==========================================
pub struct MaintenanceEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceEventRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, event_id: &str) -> RepositoryResult<Option<MaintenanceEvent>> {
        let conn = self.get_conn()?;
        find_event(&conn, event_id)
    }

    /// 某槽位的事件历史（最新在前）
    pub fn list_by_slot(&self, slot_id: &str) -> RepositoryResult<Vec<MaintenanceEvent>> {
        let conn = self.get_conn()?;
        list_events_where(&conn, "slot_id", slot_id)
    }

    /// 某机组的事件历史（最新在前）
    pub fn list_by_engine(&self, engine_id: &str) -> RepositoryResult<Vec<MaintenanceEvent>> {
        let conn = self.get_conn()?;
        list_events_where(&conn, "engine_id", engine_id)
    }
}
