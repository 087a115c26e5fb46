// ==========================================
// 机组部件追踪系统 - 部件槽位登记
// ==========================================
// 职责: 租户范围内的机组/槽位查找、安装写入、润滑记录
// 红线: 跨租户 / 跨机组访问必须显式报 PermissionDenied，不得静默忽略
// ==========================================

use crate::domain::asset::Engine;
use crate::domain::component::{ComponentSlot, Installation};
use crate::domain::counter::EngineCounters;
use crate::domain::tenant::TenantContext;
use crate::engine::error::{MaintenanceError, MaintenanceResult};
use crate::repository::asset_repo::find_engine;
use crate::repository::error::RepositoryError;
use crate::repository::slot_repo::{find_slot, update_installation, update_last_greased};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// 作用域查找（可在事务中调用）
// ==========================================

/// 按租户查找机组
///
/// - 不存在: NotFound
/// - 属于其他租户: PermissionDenied
pub fn load_engine_scoped(conn: &Connection, ctx: &TenantContext, engine_id: &str) -> MaintenanceResult<Engine> {
    let engine = find_engine(conn, engine_id)?.ok_or_else(|| MaintenanceError::not_found("Engine", engine_id))?;
    if !ctx.owns(&engine.tenant_id) {
        return Err(MaintenanceError::permission_denied("Engine", engine_id));
    }
    Ok(engine)
}

/// 按租户 + 机组查找槽位（槽位挂在其他机组下同样视为越权）
pub fn load_slot_scoped(
    conn: &Connection,
    ctx: &TenantContext,
    engine_id: &str,
    slot_id: &str,
) -> MaintenanceResult<ComponentSlot> {
    let slot = find_slot(conn, slot_id)?.ok_or_else(|| MaintenanceError::not_found("ComponentSlot", slot_id))?;
    if !ctx.owns(&slot.tenant_id) || slot.engine_id != engine_id {
        return Err(MaintenanceError::permission_denied("ComponentSlot", slot_id));
    }
    Ok(slot)
}

/// 覆写安装并持久化
pub fn apply_installation_in(
    conn: &Connection,
    slot: &mut ComponentSlot,
    installation: &Installation,
) -> Result<(), RepositoryError> {
    slot.apply_installation(installation);
    update_installation(conn, slot)
}

/// 记录润滑日期并持久化
pub fn record_lubrication_in(conn: &Connection, slot: &mut ComponentSlot, date: NaiveDate) -> Result<(), RepositoryError> {
    slot.record_lubrication(date);
    update_last_greased(conn, &slot.slot_id, date)
}

// ==========================================
// SlotRegistry - 槽位登记
// ==========================================
pub struct SlotRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SlotRegistry {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> MaintenanceResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    /// 自安装以来的运行小时
    pub fn current_usage_hours(slot: &ComponentSlot, engine: &Engine) -> i64 {
        slot.current_usage_hours(&engine.counters())
    }

    /// 自安装以来的启动次数
    pub fn current_usage_starts(slot: &ComponentSlot, engine: &Engine) -> i64 {
        slot.current_usage_starts(&engine.counters())
    }

    /// 读取机组与槽位（租户 + 机组范围校验）
    pub fn load(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        slot_id: &str,
    ) -> MaintenanceResult<(Engine, ComponentSlot)> {
        let conn = self.get_conn()?;
        let engine = load_engine_scoped(&conn, ctx, engine_id)?;
        let slot = load_slot_scoped(&conn, ctx, engine_id, slot_id)?;
        Ok((engine, slot))
    }

    /// 槽位当前用量（小时, 启动）
    pub fn usage(&self, ctx: &TenantContext, engine_id: &str, slot_id: &str) -> MaintenanceResult<EngineCounters> {
        let (engine, slot) = self.load(ctx, engine_id, slot_id)?;
        Ok(EngineCounters::new(
            Self::current_usage_hours(&slot, &engine),
            Self::current_usage_starts(&slot, &engine),
        ))
    }

    /// 覆写已装部件与安装基线（同参数重复调用结果不变）
    pub fn apply_installation(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        slot_id: &str,
        installation: &Installation,
    ) -> MaintenanceResult<ComponentSlot> {
        let conn = self.get_conn()?;
        load_engine_scoped(&conn, ctx, engine_id)?;
        let mut slot = load_slot_scoped(&conn, ctx, engine_id, slot_id)?;
        apply_installation_in(&conn, &mut slot, installation)?;
        Ok(slot)
    }

    /// 仅记录润滑日期
    pub fn record_lubrication(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        slot_id: &str,
        date: NaiveDate,
    ) -> MaintenanceResult<ComponentSlot> {
        let conn = self.get_conn()?;
        load_engine_scoped(&conn, ctx, engine_id)?;
        let mut slot = load_slot_scoped(&conn, ctx, engine_id, slot_id)?;
        record_lubrication_in(&conn, &mut slot, date)?;
        Ok(slot)
    }
}
