// ==========================================
// 机组部件追踪系统 - 机组资产 API
// ==========================================
// 职责: 机型登记、建机（含槽位生成）、机组查询、计数器读数
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{log_api_error, ApiError, ApiResult};
use crate::api::validator::{require_non_empty, require_non_negative, scoped, MAX_SLOT_QUANTITY};
use crate::domain::asset::{Engine, EngineModel, SlotQuantities};
use crate::domain::counter::EngineCounters;
use crate::domain::tenant::TenantContext;
use crate::engine::slot_provisioning::SlotProvisioner;
use crate::repository::asset_repo::EngineRepository;
use crate::repository::sql_utils::now_timestamp;

// ==========================================
// 请求 / 响应
// ==========================================

/// 建机请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEngineRequest {
    pub name: String,
    pub model_id: String,
    pub serial_number: String,
    pub location: String,
    pub hours_total: i64,
    pub starts_total: i64,
    pub in_operation: bool,
    pub slot_quantities: SlotQuantities,
}

/// 建机响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEngineResponse {
    pub engine: Engine,
    pub slots_created: usize,
}

// ==========================================
// AssetApi - 机组资产 API
// ==========================================
pub struct AssetApi {
    engine_repo: Arc<EngineRepository>,
    provisioner: Arc<SlotProvisioner>,
}

impl AssetApi {
    pub fn new(engine_repo: Arc<EngineRepository>, provisioner: Arc<SlotProvisioner>) -> Self {
        Self {
            engine_repo,
            provisioner,
        }
    }

    /// 登记机型（品牌 + 型号）
    pub fn register_model(&self, ctx: &TenantContext, brand: &str, name: &str) -> ApiResult<EngineModel> {
        let model = EngineModel {
            model_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            brand: require_non_empty("品牌", brand)?,
            name: require_non_empty("型号", name)?,
        };
        self.engine_repo.create_model(&model)?;
        tracing::info!(model_id = %model.model_id, model = %model.display_name(), "机型已登记");
        Ok(model)
    }

    /// 建机，并在同一事务内按声明数量生成槽位
    ///
    /// # 返回
    /// - Ok(CreateEngineResponse): 机组（每缸部件数量已补齐）与新建槽位数
    /// - Err(ApiError::NotFound / PermissionDenied): 机型不在当前租户
    pub fn create_engine(&self, ctx: &TenantContext, request: CreateEngineRequest) -> ApiResult<CreateEngineResponse> {
        let name = require_non_empty("机组名称", &request.name)?;
        require_non_negative("累计小时", request.hours_total)?;
        require_non_negative("累计启动次数", request.starts_total)?;
        for (field, quantity) in request.slot_quantities.entries() {
            if quantity > MAX_SLOT_QUANTITY {
                return Err(ApiError::InvalidInput(format!(
                    "槽位数量 {} 超出上限 {}: {}",
                    field, MAX_SLOT_QUANTITY, quantity
                )));
            }
        }

        let model = self.engine_repo.find_model_by_id(&request.model_id)?;
        scoped(ctx, model, |m| m.tenant_id.as_str(), "EngineModel", &request.model_id)?;

        let engine = Engine {
            engine_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            name,
            model_id: request.model_id,
            serial_number: request.serial_number.trim().to_string(),
            location: request.location.trim().to_string(),
            hours_total: request.hours_total,
            starts_total: request.starts_total,
            in_operation: request.in_operation,
            slot_quantities: request.slot_quantities,
            created_at: now_timestamp(),
        };

        let (engine, slots_created) = self
            .provisioner
            .create_engine_with_slots(&engine)
            .map_err(ApiError::from)
            .inspect_err(|e| log_api_error("create_engine", e))?;

        Ok(CreateEngineResponse { engine, slots_created })
    }

    pub fn get_engine(&self, ctx: &TenantContext, engine_id: &str) -> ApiResult<Engine> {
        let engine = self.engine_repo.find_by_id(engine_id)?;
        scoped(ctx, engine, |e| e.tenant_id.as_str(), "Engine", engine_id)
    }

    pub fn list_engines(&self, ctx: &TenantContext) -> ApiResult<Vec<Engine>> {
        Ok(self.engine_repo.list_by_tenant(&ctx.tenant_id)?)
    }

    /// 录入计数器读数（棘轮推进）
    ///
    /// 读数低于当前值视为无效输入；管理性回退修正不在本系统范围内
    pub fn record_counter_reading(
        &self,
        ctx: &TenantContext,
        engine_id: &str,
        hours: i64,
        starts: Option<i64>,
    ) -> ApiResult<EngineCounters> {
        require_non_negative("小时读数", hours)?;
        if let Some(s) = starts {
            require_non_negative("启动次数读数", s)?;
        }

        let engine = self.get_engine(ctx, engine_id)?;
        if hours < engine.hours_total {
            return Err(ApiError::InvalidInput(format!(
                "小时读数 {} 低于当前累计 {}",
                hours, engine.hours_total
            )));
        }
        if let Some(s) = starts.filter(|s| *s < engine.starts_total) {
            return Err(ApiError::InvalidInput(format!(
                "启动次数读数 {} 低于当前累计 {}",
                s, engine.starts_total
            )));
        }

        let counters = self.engine_repo.ratchet_counters(engine_id, hours, starts)?;
        tracing::info!(engine_id, hours = counters.hours, starts = counters.starts, "计数器读数已录入");
        Ok(counters)
    }
}
