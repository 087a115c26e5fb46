// ==========================================
// 机组部件追踪系统 - 部件槽位 / 预防性计划 API
// ==========================================
// 职责: 槽位列表与懒创建、计划登记、槽位报告、机组告警
// 说明: 状态计算所用的 today 默认取本地日期，*_on 版本可显式传入
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{log_api_error, ApiError, ApiResult};
use crate::api::validator::{require_in_range, require_non_empty, require_non_negative, scoped, MAX_INTERVAL_VALUE};
use crate::config::MaintenanceConfigReader;
use crate::domain::asset::Engine;
use crate::domain::component::{ComponentGroup, ComponentSlot};
use crate::domain::plan::{PlanDetail, PreventivePlan, StatusAlert};
use crate::domain::tenant::TenantContext;
use crate::domain::types::{ComponentCategory, MeasurementUnit, TriggerKind};
use crate::engine::part_life::{evaluate_part_life, PartLifeReport};
use crate::engine::plan_status::PreventivePlanEngine;
use crate::engine::slot_provisioning::SlotProvisioner;
use crate::repository::asset_repo::EngineRepository;
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::plan_repo::PreventivePlanRepository;
use crate::repository::slot_repo::ComponentSlotRepository;

// ==========================================
// 请求 / 响应
// ==========================================

/// 新增计划请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPlanRequest {
    pub slot_id: String,
    pub task: String,
    pub trigger_kind: TriggerKind,
    pub unit: MeasurementUnit,
    pub interval_value: i64,
    #[serde(default)]
    pub last_value: i64,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
}

/// 单槽位详细报告（含 OK 计划）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotReport {
    pub slot: ComponentSlot,
    pub usage_hours: i64,
    pub usage_starts: i64,
    pub plans: Vec<PlanDetail>,
    pub part_life: Option<PartLifeReport>,
}

/// 单槽位告警（仅含 WARNING / OVERDUE）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAlerts {
    pub slot_id: String,
    pub slot_name: String,
    pub alerts: Vec<StatusAlert>,
}

// ==========================================
// ComponentApi
// ==========================================
pub struct ComponentApi {
    engine_repo: Arc<EngineRepository>,
    slot_repo: Arc<ComponentSlotRepository>,
    plan_repo: Arc<PreventivePlanRepository>,
    inventory_repo: Arc<InventoryRepository>,
    provisioner: Arc<SlotProvisioner>,
    config: Arc<dyn MaintenanceConfigReader>,
}

impl ComponentApi {
    pub fn new(
        engine_repo: Arc<EngineRepository>,
        slot_repo: Arc<ComponentSlotRepository>,
        plan_repo: Arc<PreventivePlanRepository>,
        inventory_repo: Arc<InventoryRepository>,
        provisioner: Arc<SlotProvisioner>,
        config: Arc<dyn MaintenanceConfigReader>,
    ) -> Self {
        Self {
            engine_repo,
            slot_repo,
            plan_repo,
            inventory_repo,
            provisioner,
            config,
        }
    }

    // ==========================================
    // 内部: 租户范围查找
    // ==========================================

    fn scoped_engine(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Engine> {
        let engine = self.engine_repo.find_by_id(engine_id)?;
        scoped(ctx, engine, |e| e.tenant_id.as_str(), "Engine", engine_id)
    }

    fn scoped_slot(&self, ctx: &TenantContext, slot_id: &str) -> ApiResult<ComponentSlot> {
        let slot = self.slot_repo.find_by_id(slot_id)?;
        scoped(ctx, slot, |s| s.tenant_id.as_str(), "ComponentSlot", slot_id)
    }

    fn plan_engine(&self, tenant_id: &str) -> ApiResult<PreventivePlanEngine> {
        Ok(PreventivePlanEngine::new(self.config.get_status_thresholds(tenant_id)?))
    }

    // ==========================================
    // 槽位
    // ==========================================

    /// 机组下全部槽位（分组顺序 → 类型名 → 序号）
    pub fn list_slots(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Vec<ComponentSlot>> {
        self.scoped_engine(ctx, engine_id)?;
        Ok(self.slot_repo.list_by_engine(engine_id)?)
    }

    pub fn list_groups(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Vec<ComponentGroup>> {
        self.scoped_engine(ctx, engine_id)?;
        Ok(self.slot_repo.list_groups(engine_id)?)
    }

    /// 懒创建单个槽位（已存在则直接返回）
    pub fn ensure_slot(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        base_name: &str,
        seq_no: Option<i32>,
        category: ComponentCategory,
    ) -> ApiResult<ComponentSlot> {
        self.provisioner
            .ensure_slot(ctx, engine_id, base_name, seq_no, category)
            .map_err(ApiError::from)
    }

    // ==========================================
    // 计划
    // ==========================================

    pub fn add_plan(&self, ctx: &TenantContext, request: AddPlanRequest) -> ApiResult<PreventivePlan> {
        let task = require_non_empty("任务名", &request.task)?;
        require_in_range("计划间隔", request.interval_value, MAX_INTERVAL_VALUE)?;
        require_non_negative("上次执行基线", request.last_value)?;
        let slot = self.scoped_slot(ctx, &request.slot_id)?;

        let plan = PreventivePlan {
            plan_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            slot_id: slot.slot_id,
            task,
            trigger_kind: request.trigger_kind,
            unit: request.unit,
            interval_value: request.interval_value,
            last_value: request.last_value,
            last_date: request.last_date,
        };
        self.plan_repo
            .create(&plan)
            .map_err(ApiError::from)
            .inspect_err(|e| log_api_error("add_plan", e))?;

        tracing::info!(plan_id = %plan.plan_id, slot_id = %plan.slot_id, unit = %plan.unit, "预防性计划已登记");
        Ok(plan)
    }

    pub fn list_plans(&self, ctx: &TenantContext, slot_id: &str) -> ApiResult<Vec<PreventivePlan>> {
        self.scoped_slot(ctx, slot_id)?;
        Ok(self.plan_repo.list_by_slot(slot_id)?)
    }

    // ==========================================
    // 报告
    // ==========================================

    pub fn slot_report(&self, ctx: &TenantContext, slot_id: &str) -> ApiResult<SlotReport> {
        self.slot_report_on(ctx, slot_id, chrono::Local::now().date_naive())
    }

    /// 单槽位详细报告: 用量、全部计划明细、部件寿命
    pub fn slot_report_on(&self, ctx: &TenantContext, slot_id: &str, today: NaiveDate) -> ApiResult<SlotReport> {
        let slot = self.scoped_slot(ctx, slot_id)?;
        let engine = self.scoped_engine(ctx, &slot.engine_id)?;
        let counters = engine.counters();
        let plan_engine = self.plan_engine(&ctx.tenant_id)?;

        let plans = self.plan_repo.list_by_slot(slot_id)?;
        let details = plan_engine.detailed_report(&plans, &slot, &counters, today);

        let part_life = match &slot.installed_part_id {
            Some(part_id) => self.inventory_repo.find_part(part_id)?.and_then(|part| {
                evaluate_part_life(&slot, &part, &counters, today, plan_engine.thresholds().days_per_month)
            }),
            None => None,
        };

        Ok(SlotReport {
            usage_hours: slot.current_usage_hours(&counters),
            usage_starts: slot.current_usage_starts(&counters),
            slot,
            plans: details,
            part_life,
        })
    }

    pub fn engine_alerts(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Vec<SlotAlerts>> {
        self.engine_alerts_on(ctx, engine_id, chrono::Local::now().date_naive())
    }

    /// 机组告警: 仅返回存在 WARNING / OVERDUE 计划的槽位
    pub fn engine_alerts_on(&self, ctx: &TenantContext, engine_id: &str, today: NaiveDate) -> ApiResult<Vec<SlotAlerts>> {
        let engine = self.scoped_engine(ctx, engine_id)?;
        let counters = engine.counters();
        let plan_engine = self.plan_engine(&ctx.tenant_id)?;

        let mut result = Vec::new();
        for slot in self.slot_repo.list_by_engine(engine_id)? {
            let plans = self.plan_repo.list_by_slot(&slot.slot_id)?;
            if plans.is_empty() {
                continue;
            }
            let alerts = plan_engine.status_summary(&plans, &slot, &counters, today);
            if !alerts.is_empty() {
                result.push(SlotAlerts {
                    slot_id: slot.slot_id,
                    slot_name: slot.name,
                    alerts,
                });
            }
        }
        Ok(result)
    }
}
