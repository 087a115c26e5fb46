// ==========================================
// 机组部件追踪系统 - 维护事件 API
// ==========================================
// 职责: 维护事件提交、事件历史查询
// 约束: 事件处理失败时不存在任何部分修改，调用方修正输入后重新提交
// ==========================================

use std::sync::Arc;

use crate::api::error::{log_api_error, ApiError, ApiResult};
use crate::api::validator::scoped;
use crate::domain::maintenance::{MaintenanceEvent, MaintenanceEventInput, ProcessOutcome};
use crate::domain::tenant::TenantContext;
use crate::engine::maintenance_processor::MaintenanceEventProcessor;
use crate::repository::asset_repo::EngineRepository;
use crate::repository::maintenance_event_repo::MaintenanceEventRepository;
use crate::repository::slot_repo::ComponentSlotRepository;

pub struct MaintenanceApi {
    processor: Arc<MaintenanceEventProcessor>,
    event_repo: Arc<MaintenanceEventRepository>,
    engine_repo: Arc<EngineRepository>,
    slot_repo: Arc<ComponentSlotRepository>,
}

impl MaintenanceApi {
    pub fn new(
        processor: Arc<MaintenanceEventProcessor>,
        event_repo: Arc<MaintenanceEventRepository>,
        engine_repo: Arc<EngineRepository>,
        slot_repo: Arc<ComponentSlotRepository>,
    ) -> Self {
        Self {
            processor,
            event_repo,
            engine_repo,
            slot_repo,
        }
    }

    /// 提交维护事件
    ///
    /// # 返回
    /// - Ok(ProcessOutcome): 事件 ID、更新后的机组计数器、被重置的计划、是否扣减库存
    /// - Err(HierarchyViolation | IncompatiblePart | InsufficientStock | NotFound | PermissionDenied | InvalidInput)
    pub fn process_maintenance_event(
        &self,
        ctx: &TenantContext,
        input: &MaintenanceEventInput,
    ) -> ApiResult<ProcessOutcome> {
        self.processor
            .process(ctx, input)
            .map_err(ApiError::from)
            .inspect_err(|e| log_api_error("process_maintenance_event", e))
    }

    /// 槽位事件历史（最新在前）
    pub fn list_slot_history(&self, ctx: &TenantContext, slot_id: &str) -> ApiResult<Vec<MaintenanceEvent>> {
        let slot = self.slot_repo.find_by_id(slot_id)?;
        scoped(ctx, slot, |s| s.tenant_id.as_str(), "ComponentSlot", slot_id)?;
        Ok(self.event_repo.list_by_slot(slot_id)?)
    }

    /// 机组事件历史（最新在前）
    pub fn list_engine_history(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Vec<MaintenanceEvent>> {
        let engine = self.engine_repo.find_by_id(engine_id)?;
        scoped(ctx, engine, |e| e.tenant_id.as_str(), "Engine", engine_id)?;
        Ok(self.event_repo.list_by_engine(engine_id)?)
    }

    pub fn get_event(&self, ctx: &TenantContext, event_id: &str) -> ApiResult<MaintenanceEvent> {
        let event = self.event_repo.find_by_id(event_id)?;
        scoped(ctx, event, |e| e.tenant_id.as_str(), "MaintenanceEvent", event_id)
    }
}
