// ==========================================
// 机组部件追踪系统 - 槽位生成
// ==========================================
// 职责: 按机组声明的数量生成槽位（建机时一次性同步批量生成）
// 规则:
// - 数量为 1: 裸名称；数量 > 1: 名称后缀 " #NN"
// - 每缸两个槽位: "Cylinder NN - Spark Plug" / "Cylinder NN - Injector"
// - 固定各一个: "Engine Oil (Sump)" / "Coolant"
// 幂等: 按 (engine_id, name) get-or-create，重复执行不产生重复槽位
// ==========================================

use crate::domain::asset::{Engine, SlotQuantities};
use crate::domain::component::ComponentSlot;
use crate::domain::tenant::TenantContext;
use crate::domain::types::ComponentCategory;
use crate::engine::error::{MaintenanceError, MaintenanceResult};
use crate::engine::slot_registry::load_engine_scoped;
use crate::repository::asset_repo::insert_engine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::slot_repo::{ensure_group, find_slot_by_name, insert_slot_if_absent};
use crate::repository::sql_utils::now_timestamp;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// SlotSpec - 待生成槽位描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: String,
    pub base_name: String,
    pub seq_no: i32,
    pub category: ComponentCategory,
}

/// 按声明数量推导槽位清单（纯函数）
pub fn plan_slots(quantities: &SlotQuantities) -> Vec<SlotSpec> {
    let mut specs = Vec::new();

    // 油路
    push_numbered(&mut specs, "Engine Oil (Sump)", 1, ComponentCategory::OilSystem);
    push_numbered(&mut specs, "Oil Filter", quantities.oil_filters, ComponentCategory::OilSystem);
    push_numbered(&mut specs, "Oil Cooler", quantities.oil_coolers, ComponentCategory::OilSystem);

    // 外围
    push_numbered(&mut specs, "Turbo", quantities.turbos, ComponentCategory::Peripherals);
    push_numbered(&mut specs, "Starter Motor", quantities.starter_motors, ComponentCategory::Peripherals);
    push_numbered(&mut specs, "Intercooler", quantities.intercoolers, ComponentCategory::Peripherals);
    push_numbered(&mut specs, "Alternator", quantities.alternators, ComponentCategory::Peripherals);
    push_numbered(&mut specs, "Damper", quantities.dampers, ComponentCategory::Peripherals);
    push_numbered(
        &mut specs,
        "Exhaust Compensator",
        quantities.exhaust_compensators,
        ComponentCategory::Peripherals,
    );
    push_numbered(&mut specs, "Heater", quantities.heaters, ComponentCategory::Peripherals);
    push_numbered(&mut specs, "Bypass Valve", quantities.bypass_valves, ComponentCategory::Peripherals);

    // 滤清器
    push_numbered(&mut specs, "Air Filter", quantities.air_filters, ComponentCategory::Filters);
    push_numbered(&mut specs, "Pre Air Filter", quantities.pre_air_filters, ComponentCategory::Filters);
    push_numbered(&mut specs, "Gas Filter", quantities.gas_filters, ComponentCategory::Filters);

    // 气缸
    for i in 1..=quantities.cylinders {
        for part in ["Spark Plug", "Injector"] {
            specs.push(SlotSpec {
                name: format!("Cylinder {:02} - {}", i, part),
                base_name: format!("Cylinder {}", part),
                seq_no: i as i32,
                category: ComponentCategory::Cylinders,
            });
        }
    }

    // 点火 / 电气
    push_numbered(&mut specs, "Battery", quantities.batteries, ComponentCategory::Ignition);
    push_numbered(&mut specs, "Ignition Coil", quantities.ignition_coils, ComponentCategory::Ignition);
    push_numbered(&mut specs, "Spark Plug Cable", quantities.plug_cables, ComponentCategory::Ignition);

    push_numbered(&mut specs, "Coolant", 1, ComponentCategory::Other);

    specs
}

fn push_numbered(specs: &mut Vec<SlotSpec>, base_name: &str, quantity: u32, category: ComponentCategory) {
    for i in 1..=quantity {
        let name = if quantity > 1 {
            format!("{} #{:02}", base_name, i)
        } else {
            base_name.to_string()
        };
        specs.push(SlotSpec {
            name,
            base_name: base_name.to_string(),
            seq_no: i as i32,
            category,
        });
    }
}

// ==========================================
// 事务内操作（自由函数）
// ==========================================

/// get-or-create 单个槽位，返回该槽位
pub fn ensure_slot_in(conn: &Connection, engine: &Engine, spec: &SlotSpec) -> RepositoryResult<ComponentSlot> {
    if let Some(existing) = find_slot_by_name(conn, &engine.engine_id, &spec.name)? {
        return Ok(existing);
    }

    let group_id = ensure_group(
        conn,
        &engine.tenant_id,
        &engine.engine_id,
        spec.category.display_name(),
        spec.category.sort_order(),
    )?;

    let slot = ComponentSlot {
        slot_id: Uuid::new_v4().to_string(),
        tenant_id: engine.tenant_id.clone(),
        engine_id: engine.engine_id.clone(),
        group_id: Some(group_id),
        name: spec.name.clone(),
        base_name: Some(spec.base_name.clone()),
        seq_no: spec.seq_no,
        installed_part_id: None,
        serial_number: None,
        installed_on: None,
        install_hours: 0,
        install_starts: 0,
        last_greased_on: None,
        created_at: now_timestamp(),
    };
    insert_slot_if_absent(conn, &slot)?;

    find_slot_by_name(conn, &engine.engine_id, &spec.name)?
        .ok_or_else(|| RepositoryError::not_found("ComponentSlot", &spec.name))
}

/// 按机组声明数量批量生成槽位
///
/// # 返回
/// 新建槽位数量（已存在的不计）
pub fn provision_slots_in(conn: &Connection, engine: &Engine) -> RepositoryResult<usize> {
    let mut created = 0;
    for spec in plan_slots(&engine.slot_quantities) {
        if find_slot_by_name(conn, &engine.engine_id, &spec.name)?.is_none() {
            ensure_slot_in(conn, engine, &spec)?;
            created += 1;
        }
    }
    Ok(created)
}

// ==========================================
// SlotProvisioner - 槽位生成器
// ==========================================
pub struct SlotProvisioner {
    conn: Arc<Mutex<Connection>>,
}

impl SlotProvisioner {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 建机: 写入机组并生成全部槽位（同一事务）
    ///
    /// 每缸一件的部件数量为 0 时按缸数补齐
    pub fn create_engine_with_slots(&self, engine: &Engine) -> RepositoryResult<(Engine, usize)> {
        let mut engine = engine.clone();
        engine.slot_quantities = engine.slot_quantities.clone().with_cylinder_defaults();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        insert_engine(&tx, &engine)?;
        let created = provision_slots_in(&tx, &engine)?;
        tx.commit()?;

        tracing::info!(
            engine_id = %engine.engine_id,
            tenant_id = %engine.tenant_id,
            slots_created = created,
            "机组已创建并生成槽位"
        );
        Ok((engine, created))
    }

    /// 对已存在机组重新执行生成（补齐缺失槽位，不修改已有槽位）
    pub fn reprovision(&self, ctx: &TenantContext, engine_id: &str) -> MaintenanceResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(RepositoryError::from)?;
        let engine = load_engine_scoped(&tx, ctx, engine_id)?;
        let created = provision_slots_in(&tx, &engine)?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(created)
    }

    /// 懒创建单个槽位（按目录驱动，名称已存在时直接返回）
    pub fn ensure_slot(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        base_name: &str,
        seq_no: Option<i32>,
        category: ComponentCategory,
    ) -> MaintenanceResult<ComponentSlot> {
        let base_name = base_name.trim();
        if base_name.is_empty() {
            return Err(MaintenanceError::InvalidInput("槽位名称不能为空".to_string()));
        }
        if matches!(seq_no, Some(n) if n < 1) {
            return Err(MaintenanceError::InvalidInput("槽位序号必须 >= 1".to_string()));
        }

        let spec = SlotSpec {
            name: match seq_no {
                Some(n) => format!("{} #{:02}", base_name, n),
                None => base_name.to_string(),
            },
            base_name: base_name.to_string(),
            seq_no: seq_no.unwrap_or(1),
            category,
        };

        let conn = self.get_conn()?;
        let engine = load_engine_scoped(&conn, ctx, engine_id)?;
        Ok(ensure_slot_in(&conn, &engine, &spec)?)
    }
}
