// ==========================================
// 机组部件追踪系统 - 预防性计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 计划定义由人工维护；基线只由维护事件处理器重置
// ==========================================

use crate::domain::plan::PreventivePlan;
use crate::domain::types::{MeasurementUnit, TriggerKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_date, parse_enum, parse_opt_date};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PLAN_COLUMNS: &str = r#"
    plan_id, tenant_id, slot_id, task, trigger_kind, unit, interval_value, last_value, last_date
"#;

fn map_plan_row(row: &Row<'_>) -> rusqlite::Result<PreventivePlan> {
    Ok(PreventivePlan {
        plan_id: row.get(0)?,
        tenant_id: row.get(1)?,
        slot_id: row.get(2)?,
        task: row.get(3)?,
        trigger_kind: parse_enum(4, &row.get::<_, String>(4)?, TriggerKind::from_db_str)?,
        unit: parse_enum(5, &row.get::<_, String>(5)?, MeasurementUnit::from_db_str)?,
        interval_value: row.get(6)?,
        last_value: row.get(7)?,
        last_date: parse_opt_date(8, row.get(8)?)?,
    })
}

// ==========================================
// 自由函数（可在事务中调用）
// ==========================================

pub fn insert_plan(conn: &Connection, plan: &PreventivePlan) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO preventive_plan ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            PLAN_COLUMNS
        ),
        params![
            plan.plan_id,
            plan.tenant_id,
            plan.slot_id,
            plan.task,
            plan.trigger_kind.to_db_str(),
            plan.unit.to_db_str(),
            plan.interval_value,
            plan.last_value,
            plan.last_date.map(format_date),
        ],
    )?;
    Ok(())
}

pub fn find_plan(conn: &Connection, plan_id: &str) -> RepositoryResult<Option<PreventivePlan>> {
    let plan = conn
        .query_row(
            &format!("SELECT {} FROM preventive_plan WHERE plan_id = ?1", PLAN_COLUMNS),
            params![plan_id],
            map_plan_row,
        )
        .optional()?;
    Ok(plan)
}

pub fn list_plans_by_slot(conn: &Connection, slot_id: &str) -> RepositoryResult<Vec<PreventivePlan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM preventive_plan WHERE slot_id = ?1 ORDER BY task ASC, plan_id ASC",
        PLAN_COLUMNS
    ))?;
    let plans = stmt
        .query_map(params![slot_id], map_plan_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(plans)
}

/// 写回执行基线（last_value / last_date）
pub fn update_baseline(conn: &Connection, plan: &PreventivePlan) -> RepositoryResult<()> {
    let updated = conn.execute(
        "UPDATE preventive_plan SET last_value = ?2, last_date = ?3 WHERE plan_id = ?1",
        params![plan.plan_id, plan.last_value, plan.last_date.map(format_date)],
    )?;
    if updated == 0 {
        return Err(RepositoryError::not_found("PreventivePlan", &plan.plan_id));
    }
    Ok(())
}

// ==========================================
// PreventivePlanRepository - 计划仓储
// ==========================================
pub struct PreventivePlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PreventivePlanRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, plan: &PreventivePlan) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_plan(&conn, plan)
    }

    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<PreventivePlan>> {
        let conn = self.get_conn()?;
        find_plan(&conn, plan_id)
    }

    pub fn list_by_slot(&self, slot_id: &str) -> RepositoryResult<Vec<PreventivePlan>> {
        let conn = self.get_conn()?;
        list_plans_by_slot(&conn, slot_id)
    }
}
