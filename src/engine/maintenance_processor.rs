// ==========================================
// 机组部件追踪系统 - 维护事件处理器
// ==========================================
// 职责: 单个维护事件的事务性处理
// 流程（同一事务内，任一步失败整体回滚）:
//   1. 租户范围查找机组/槽位（IMMEDIATE 事务，BEGIN 时即持有写锁）
//   2. 层级校验: 上报小时不得大于机组累计小时
//   3. 兼容性校验（更换 / 新装）
//   4. 库存扣减（更换 / 新装）+ OUT 流水
//   5. 槽位变更: 更换 / 新装 → 写安装基线；润滑 → 记润滑日期
//   6. 机组计数器棘轮
//   7. 预防性计划重置
//   8. 追加维护事件记录
// 红线: 不存在部分成功；事件记录只追加
// ==========================================

use crate::domain::component::Installation;
use crate::domain::inventory::{CatalogPart, StockItem, StockMovement};
use crate::domain::maintenance::{MaintenanceEvent, MaintenanceEventInput, ProcessOutcome};
use crate::domain::tenant::TenantContext;
use crate::domain::types::{MovementType, TriggerKind};
use crate::engine::error::{MaintenanceError, MaintenanceResult};
use crate::engine::plan_status::PreventivePlanEngine;
use crate::engine::slot_registry::{
    apply_installation_in, load_engine_scoped, load_slot_scoped, record_lubrication_in,
};
use crate::repository::asset_repo::{find_model, ratchet_counters};
use crate::repository::error::RepositoryError;
use crate::repository::inventory_repo::{decrement_quantity, find_part, find_stock_item, insert_movement};
use crate::repository::maintenance_event_repo::insert_event;
use crate::repository::plan_repo::{list_plans_by_slot, update_baseline};
use crate::repository::sql_utils::now_timestamp;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::instrument;
use uuid::Uuid;

/// 库存消耗流水的来源前缀
pub const EVENT_ORIGIN_PREFIX: &str = "maintenance_event:";

// ==========================================
// MaintenanceEventProcessor - 维护事件处理器
// ==========================================
pub struct MaintenanceEventProcessor {
    conn: Arc<Mutex<Connection>>,
    plan_engine: PreventivePlanEngine,
}

/// 已解析的库存引用
struct ResolvedStock {
    item: StockItem,
    part: CatalogPart,
}

impl MaintenanceEventProcessor {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            plan_engine: PreventivePlanEngine::default(),
        }
    }

    fn get_conn(&self) -> MaintenanceResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    /// 处理单个维护事件
    ///
    /// # 失败
    /// - HierarchyViolation / IncompatiblePart / InsufficientStock: 校验失败，无任何修改
    /// - NotFound / PermissionDenied: 租户范围内无法解析
    /// - InvalidInput: 输入本身非法（负数、数量为 0、缺少必填序列号）
    #[instrument(
        skip(self, ctx, input),
        fields(
            tenant_id = %ctx.tenant_id,
            engine_id = %input.engine_id,
            slot_id = %input.slot_id,
            trigger = %input.trigger_kind
        )
    )]
    pub fn process(&self, ctx: &TenantContext, input: &MaintenanceEventInput) -> MaintenanceResult<ProcessOutcome> {
        validate_input(input)?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        // ===== 1. 查找 =====
        let engine = load_engine_scoped(&tx, ctx, &input.engine_id)?;
        let mut slot = load_slot_scoped(&tx, ctx, &input.engine_id, &input.slot_id)?;
        let stock = match &input.stock_item_id {
            Some(item_id) => Some(resolve_stock(&tx, ctx, item_id)?),
            None => None,
        };

        // ===== 2. 层级校验（等于时通过） =====
        if input.hours_at_execution > engine.hours_total {
            tracing::info!(
                reported_hours = input.hours_at_execution,
                engine_hours = engine.hours_total,
                "层级校验失败"
            );
            return Err(MaintenanceError::HierarchyViolation {
                reported_hours: input.hours_at_execution,
                engine_hours: engine.hours_total,
            });
        }

        let event_id = Uuid::new_v4().to_string();
        let installs_part = input.trigger_kind.installs_part();
        let mut quantity_used = 0;

        if installs_part {
            if let Some(ResolvedStock { item, part }) = &stock {
                // ===== 3. 兼容性 =====
                if !part.is_compatible_with(&engine.model_id) {
                    let model_name = find_model(&tx, &engine.model_id)?
                        .map(|m| m.display_name())
                        .unwrap_or_else(|| engine.model_id.clone());
                    tracing::info!(part = %part.name, model = %model_name, "部件与机型不兼容");
                    return Err(MaintenanceError::IncompatiblePart {
                        part_name: part.name.clone(),
                        model_name,
                    });
                }

                if part.requires_serial && input.new_serial.as_deref().map_or(true, |s| s.trim().is_empty()) {
                    return Err(MaintenanceError::InvalidInput(format!(
                        "部件 {} 安装时必须填写序列号",
                        part.name
                    )));
                }

                // ===== 4. 库存扣减 =====
                let required = input.quantity.unwrap_or(part.units_per_install);
                if !decrement_quantity(&tx, &item.item_id, required)? {
                    tracing::info!(available = item.quantity, required, "库存不足");
                    return Err(MaintenanceError::InsufficientStock {
                        available: item.quantity,
                        required,
                    });
                }
                insert_movement(
                    &tx,
                    &StockMovement {
                        movement_id: Uuid::new_v4().to_string(),
                        tenant_id: ctx.tenant_id.clone(),
                        item_id: item.item_id.clone(),
                        movement_type: MovementType::Out,
                        quantity: required,
                        moved_at: now_timestamp(),
                        origin: Some(format!("{}{}", EVENT_ORIGIN_PREFIX, event_id)),
                    },
                )?;
                quantity_used = required;
                tracing::debug!(item_id = %item.item_id, required, "库存已扣减");
            }
        }

        // ===== 5. 槽位变更 =====
        if installs_part {
            let installation = Installation {
                part_id: stock
                    .as_ref()
                    .map(|s| s.part.part_id.clone())
                    .or_else(|| slot.installed_part_id.clone()),
                serial_number: match (&input.new_serial, &stock) {
                    (Some(serial), _) => Some(serial.trim().to_string()),
                    // 未换件（无库存引用）时保留原序列号
                    (None, None) => slot.serial_number.clone(),
                    (None, Some(_)) => None,
                },
                installed_on: input.event_date,
                hours_at_install: input.hours_at_execution,
                starts_at_install: input.starts_at_execution.unwrap_or(engine.starts_total),
            };
            apply_installation_in(&tx, &mut slot, &installation)?;
            tracing::debug!(install_hours = slot.install_hours, "槽位安装基线已更新");
        } else if input.trigger_kind == TriggerKind::Lubrication {
            record_lubrication_in(&tx, &mut slot, input.event_date)?;
            tracing::debug!("润滑日期已记录");
        }

        // ===== 6. 计数器棘轮 =====
        // 经步骤 2 校验后小时数不会超过当前值，此处实际只推进启动次数
        let counters = ratchet_counters(&tx, &engine.engine_id, input.hours_at_execution, input.starts_at_execution)?;

        // ===== 7. 计划重置 =====
        let mut plans_reset = Vec::new();
        for mut plan in list_plans_by_slot(&tx, &slot.slot_id)? {
            if !plan.is_reset_by(input.trigger_kind) {
                continue;
            }
            self.plan_engine.reset_plan(
                &mut plan,
                input.event_date,
                input.hours_at_execution,
                input.starts_at_execution,
                &counters,
            );
            update_baseline(&tx, &plan)?;
            plans_reset.push(plan.plan_id);
        }
        tracing::debug!(plans_reset = plans_reset.len(), "计划基线已重置");

        // ===== 8. 追加事件 =====
        let event = MaintenanceEvent {
            event_id: event_id.clone(),
            tenant_id: ctx.tenant_id.clone(),
            engine_id: engine.engine_id.clone(),
            slot_id: slot.slot_id.clone(),
            event_date: input.event_date,
            trigger_kind: input.trigger_kind,
            hours_at_execution: input.hours_at_execution,
            starts_at_execution: input.starts_at_execution,
            stock_item_id: stock.as_ref().map(|s| s.item.item_id.clone()),
            quantity_used,
            new_serial: input.new_serial.clone(),
            note: input.note.clone().unwrap_or_default(),
            responsible: ctx.user_id.clone(),
            created_at: now_timestamp(),
        };
        insert_event(&tx, &event)?;

        tx.commit().map_err(RepositoryError::from)?;

        tracing::info!(
            event_id = %event_id,
            engine_hours = counters.hours,
            engine_starts = counters.starts,
            plans_reset = plans_reset.len(),
            stock_decremented = quantity_used > 0,
            "维护事件已处理"
        );

        Ok(ProcessOutcome {
            event_id,
            event,
            updated_engine_hours: counters.hours,
            updated_engine_starts: counters.starts,
            plans_reset,
            stock_decremented: quantity_used > 0,
        })
    }
}

fn validate_input(input: &MaintenanceEventInput) -> MaintenanceResult<()> {
    if input.hours_at_execution < 0 {
        return Err(MaintenanceError::InvalidInput(format!(
            "执行时小时数不能为负: {}",
            input.hours_at_execution
        )));
    }
    if let Some(starts) = input.starts_at_execution {
        if starts < 0 {
            return Err(MaintenanceError::InvalidInput(format!("执行时启动次数不能为负: {}", starts)));
        }
    }
    if let Some(quantity) = input.quantity {
        if quantity <= 0 {
            return Err(MaintenanceError::InvalidInput(format!("消耗数量必须 > 0: {}", quantity)));
        }
    }
    Ok(())
}

/// 解析库存条目及其目录部件（租户范围）
fn resolve_stock(conn: &Connection, ctx: &TenantContext, item_id: &str) -> MaintenanceResult<ResolvedStock> {
    let item = find_stock_item(conn, item_id)?.ok_or_else(|| MaintenanceError::not_found("StockItem", item_id))?;
    if !ctx.owns(&item.tenant_id) {
        return Err(MaintenanceError::permission_denied("StockItem", item_id));
    }
    let part = find_part(conn, &item.part_id)?
        .ok_or_else(|| MaintenanceError::not_found("CatalogPart", &item.part_id))?;
    Ok(ResolvedStock { item, part })
}
