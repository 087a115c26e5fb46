// ==========================================
// 机组部件追踪系统 - 部件槽位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 槽位不提供删除（数据库触发器同样拒绝 DELETE）
// ==========================================

use crate::domain::component::{ComponentGroup, ComponentSlot};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_date, format_datetime, parse_datetime, parse_opt_date};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SLOT_COLUMNS: &str = r#"
    slot_id, tenant_id, engine_id, group_id, name, base_name, seq_no,
    installed_part_id, serial_number, installed_on, install_hours, install_starts,
    last_greased_on, created_at
"#;

fn map_slot_row(row: &Row<'_>) -> rusqlite::Result<ComponentSlot> {
    Ok(ComponentSlot {
        slot_id: row.get(0)?,
        tenant_id: row.get(1)?,
        engine_id: row.get(2)?,
        group_id: row.get(3)?,
        name: row.get(4)?,
        base_name: row.get(5)?,
        seq_no: row.get(6)?,
        installed_part_id: row.get(7)?,
        serial_number: row.get(8)?,
        installed_on: parse_opt_date(9, row.get(9)?)?,
        install_hours: row.get(10)?,
        install_starts: row.get(11)?,
        last_greased_on: parse_opt_date(12, row.get(12)?)?,
        created_at: parse_datetime(13, &row.get::<_, String>(13)?)?,
    })
}

// ==========================================
// 自由函数（可在事务中调用）
// ==========================================

pub fn find_slot(conn: &Connection, slot_id: &str) -> RepositoryResult<Option<ComponentSlot>> {
    let slot = conn
        .query_row(
            &format!("SELECT {} FROM component_slot WHERE slot_id = ?1", SLOT_COLUMNS),
            params![slot_id],
            map_slot_row,
        )
        .optional()?;
    Ok(slot)
}

pub fn find_slot_by_name(conn: &Connection, engine_id: &str, name: &str) -> RepositoryResult<Option<ComponentSlot>> {
    let slot = conn
        .query_row(
            &format!(
                "SELECT {} FROM component_slot WHERE engine_id = ?1 AND name = ?2",
                SLOT_COLUMNS
            ),
            params![engine_id, name],
            map_slot_row,
        )
        .optional()?;
    Ok(slot)
}

/// 按分组顺序 → 类型名 → 序号排序
pub fn list_slots_by_engine(conn: &Connection, engine_id: &str) -> RepositoryResult<Vec<ComponentSlot>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM component_slot s
        LEFT JOIN component_group g ON g.group_id = s.group_id
        WHERE s.engine_id = ?1
        ORDER BY COALESCE(g.sort_order, 999) ASC, s.base_name ASC, s.seq_no ASC, s.name ASC
        "#,
        SLOT_COLUMNS
            .split(',')
            .map(|c| format!("s.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;
    let slots = stmt
        .query_map(params![engine_id], map_slot_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(slots)
}

/// 插入槽位（按 engine_id + name 去重）
///
/// # 返回
/// - Ok(true): 新建
/// - Ok(false): 同名槽位已存在，未做任何修改
pub fn insert_slot_if_absent(conn: &Connection, slot: &ComponentSlot) -> RepositoryResult<bool> {
    let inserted = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO component_slot ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            SLOT_COLUMNS
        ),
        params![
            slot.slot_id,
            slot.tenant_id,
            slot.engine_id,
            slot.group_id,
            slot.name,
            slot.base_name,
            slot.seq_no,
            slot.installed_part_id,
            slot.serial_number,
            slot.installed_on.map(format_date),
            slot.install_hours,
            slot.install_starts,
            slot.last_greased_on.map(format_date),
            format_datetime(slot.created_at),
        ],
    )?;
    Ok(inserted > 0)
}

/// 写入已装部件与四个安装基线
pub fn update_installation(conn: &Connection, slot: &ComponentSlot) -> RepositoryResult<()> {
    let updated = conn.execute(
        r#"
        UPDATE component_slot
        SET installed_part_id = ?2,
            serial_number = ?3,
            installed_on = ?4,
            install_hours = ?5,
            install_starts = ?6
        WHERE slot_id = ?1
        "#,
        params![
            slot.slot_id,
            slot.installed_part_id,
            slot.serial_number,
            slot.installed_on.map(format_date),
            slot.install_hours,
            slot.install_starts,
        ],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("ComponentSlot", &slot.slot_id));
    }
    Ok(())
}

pub fn update_last_greased(conn: &Connection, slot_id: &str, date: NaiveDate) -> RepositoryResult<()> {
    let updated = conn.execute(
        "UPDATE component_slot SET last_greased_on = ?2 WHERE slot_id = ?1",
        params![slot_id, format_date(date)],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("ComponentSlot", slot_id));
    }
    Ok(())
}

/// 获取或创建分组，返回 group_id
pub fn ensure_group(
    conn: &Connection,
    tenant_id: &str,
    engine_id: &str,
    name: &str,
    sort_order: i32,
) -> RepositoryResult<String> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT group_id FROM component_group WHERE engine_id = ?1 AND name = ?2",
            params![engine_id, name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(group_id) = existing {
        return Ok(group_id);
    }

    let group_id = Uuid::new_v4().to_string();
    conn.execute(
        r#"
        INSERT INTO component_group (group_id, tenant_id, engine_id, name, sort_order)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![group_id, tenant_id, engine_id, name, sort_order],
    )?;
    Ok(group_id)
}

pub fn list_groups_by_engine(conn: &Connection, engine_id: &str) -> RepositoryResult<Vec<ComponentGroup>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT group_id, tenant_id, engine_id, name, sort_order
        FROM component_group
        WHERE engine_id = ?1
        ORDER BY sort_order ASC, name ASC
        "#,
    )?;
    let groups = stmt
        .query_map(params![engine_id], |row| {
            Ok(ComponentGroup {
                group_id: row.get(0)?,
                tenant_id: row.get(1)?,
                engine_id: row.get(2)?,
                name: row.get(3)?,
                sort_order: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(groups)
}

// ==========================================
// ComponentSlotRepository - 槽位仓储
// ==========================================
/// 槽位仓储
/// 职责: 管理 component_group / component_slot 表
pub struct ComponentSlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComponentSlotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, slot_id: &str) -> RepositoryResult<Option<ComponentSlot>> {
        let conn = self.get_conn()?;
        find_slot(&conn, slot_id)
    }

    pub fn list_by_engine(&self, engine_id: &str) -> RepositoryResult<Vec<ComponentSlot>> {
        let conn = self.get_conn()?;
        list_slots_by_engine(&conn, engine_id)
    }

    pub fn list_groups(&self, engine_id: &str) -> RepositoryResult<Vec<ComponentGroup>> {
        let conn = self.get_conn()?;
        list_groups_by_engine(&conn, engine_id)
    }
}
