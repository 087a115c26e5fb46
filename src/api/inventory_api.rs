// ==========================================
// 机组部件追踪系统 - 库存 API
// ==========================================
// 职责: 部件目录登记、库位、入库、盘点、流水与低库存查询
// 约束: 每次数量变化都追加一条库存流水
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{log_api_error, ApiError, ApiResult};
use crate::api::validator::{
    require_in_range, require_non_empty, require_non_negative, require_positive, scoped, MAX_INTERVAL_VALUE,
};
use crate::config::MaintenanceConfigReader;
use crate::domain::inventory::{CatalogPart, StockItem, StockLocation, StockMovement};
use crate::domain::tenant::TenantContext;
use crate::domain::types::MovementType;
use crate::repository::asset_repo::EngineRepository;
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::sql_utils::now_timestamp;

// ==========================================
// 请求
// ==========================================

/// 部件目录登记请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPartRequest {
    pub name: String,
    pub manufacturer_code: Option<String>,
    pub category: String,
    pub universal: bool,
    pub compatible_model_ids: Vec<String>,
    pub requires_serial: bool,
    pub units_per_install: i64,
    pub life_hours: Option<i64>,
    pub life_starts: Option<i64>,
    pub life_months: Option<i64>,
    pub alert_pct: i64,
}

impl Default for RegisterPartRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            manufacturer_code: None,
            category: "Other".to_string(),
            universal: false,
            compatible_model_ids: Vec::new(),
            requires_serial: false,
            units_per_install: 1,
            life_hours: None,
            life_starts: None,
            life_months: None,
            alert_pct: 90,
        }
    }
}

// ==========================================
// InventoryApi
// ==========================================
pub struct InventoryApi {
    inventory_repo: Arc<InventoryRepository>,
    engine_repo: Arc<EngineRepository>,
    config: Arc<dyn MaintenanceConfigReader>,
}

impl InventoryApi {
    pub fn new(
        inventory_repo: Arc<InventoryRepository>,
        engine_repo: Arc<EngineRepository>,
        config: Arc<dyn MaintenanceConfigReader>,
    ) -> Self {
        Self {
            inventory_repo,
            engine_repo,
            config,
        }
    }

    /// 登记部件目录条目
    ///
    /// 兼容机型必须属于当前租户
    pub fn register_part(&self, ctx: &TenantContext, request: RegisterPartRequest) -> ApiResult<CatalogPart> {
        let name = require_non_empty("部件名称", &request.name)?;
        require_positive("每次安装消耗数量", request.units_per_install)?;
        if !(1..=100).contains(&request.alert_pct) {
            return Err(ApiError::InvalidInput(format!(
                "寿命预警百分比超出范围 [1, 100]: {}",
                request.alert_pct
            )));
        }
        for (field, limit) in [
            ("寿命小时", request.life_hours),
            ("寿命启动次数", request.life_starts),
            ("寿命月数", request.life_months),
        ] {
            if let Some(v) = limit {
                require_in_range(field, v, MAX_INTERVAL_VALUE)?;
            }
        }
        for model_id in &request.compatible_model_ids {
            let model = self.engine_repo.find_model_by_id(model_id)?;
            scoped(ctx, model, |m| m.tenant_id.as_str(), "EngineModel", model_id)?;
        }

        let part = CatalogPart {
            part_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            name,
            manufacturer_code: request.manufacturer_code.filter(|c| !c.trim().is_empty()),
            category: request.category,
            universal: request.universal,
            compatible_model_ids: request.compatible_model_ids,
            requires_serial: request.requires_serial,
            units_per_install: request.units_per_install,
            life_hours: request.life_hours,
            life_starts: request.life_starts,
            life_months: request.life_months,
            alert_pct: request.alert_pct,
        };
        self.inventory_repo.create_part(&part)?;
        tracing::info!(part_id = %part.part_id, name = %part.name, "部件目录已登记");
        Ok(part)
    }

    pub fn get_part(&self, ctx: &TenantContext, part_id: &str) -> ApiResult<CatalogPart> {
        let part = self.inventory_repo.find_part(part_id)?;
        scoped(ctx, part, |p| p.tenant_id.as_str(), "CatalogPart", part_id)
    }

    pub fn add_location(&self, ctx: &TenantContext, name: &str) -> ApiResult<StockLocation> {
        let location = StockLocation {
            location_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            name: require_non_empty("库位名称", name)?,
        };
        self.inventory_repo.create_location(&location)?;
        Ok(location)
    }

    /// 入库: 条目不存在时新建，记录 IN 流水
    ///
    /// `safety_min` 仅在新建条目时生效
    pub fn receive_stock(
        &self,
        ctx: &TenantContext,
        part_id: &str,
        location_id: &str,
        quantity: i64,
        safety_min: i64,
    ) -> ApiResult<StockItem> {
        require_positive("入库数量", quantity)?;
        require_non_negative("安全库存", safety_min)?;
        self.get_part(ctx, part_id)?;
        let location = self.inventory_repo.find_location(location_id)?;
        scoped(ctx, location, |l| l.tenant_id.as_str(), "StockLocation", location_id)?;

        let new_item = StockItem {
            item_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            part_id: part_id.to_string(),
            location_id: location_id.to_string(),
            quantity: 0,
            safety_min,
        };
        let movement = StockMovement {
            movement_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            item_id: new_item.item_id.clone(),
            movement_type: MovementType::In,
            quantity,
            moved_at: now_timestamp(),
            origin: Some(format!("receipt:{}", ctx.user_id)),
        };

        let item = self
            .inventory_repo
            .receive(&new_item, &movement)
            .map_err(ApiError::from)
            .inspect_err(|e| log_api_error("receive_stock", e))?;
        tracing::info!(item_id = %item.item_id, received = quantity, on_hand = item.quantity, "入库完成");
        Ok(item)
    }

    /// 盘点: 覆写在库数量，ADJUST 流水记录差值
    ///
    /// 差值在仓储事务内按当时的在库数量计算
    pub fn adjust_stock(&self, ctx: &TenantContext, item_id: &str, new_quantity: i64) -> ApiResult<StockItem> {
        require_non_negative("盘点数量", new_quantity)?;
        let item = self.get_stock_item(ctx, item_id)?;

        let movement = StockMovement {
            movement_id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            item_id: item.item_id,
            movement_type: MovementType::Adjust,
            quantity: 0,
            moved_at: now_timestamp(),
            origin: Some(format!("count:{}", ctx.user_id)),
        };
        let (before, adjusted) = self
            .inventory_repo
            .adjust(item_id, new_quantity, &movement)
            .map_err(ApiError::from)
            .inspect_err(|e| log_api_error("adjust_stock", e))?;
        tracing::info!(item_id, before, after = adjusted.quantity, "盘点调整完成");
        Ok(adjusted)
    }

    pub fn get_stock_item(&self, ctx: &TenantContext, item_id: &str) -> ApiResult<StockItem> {
        let item = self.inventory_repo.find_item(item_id)?;
        scoped(ctx, item, |i| i.tenant_id.as_str(), "StockItem", item_id)
    }

    pub fn list_stock(&self, ctx: &TenantContext) -> ApiResult<Vec<StockItem>> {
        Ok(self.inventory_repo.list_items(&ctx.tenant_id)?)
    }

    /// 库存流水（最新在前）
    pub fn list_movements(&self, ctx: &TenantContext, item_id: &str) -> ApiResult<Vec<StockMovement>> {
        self.get_stock_item(ctx, item_id)?;
        Ok(self.inventory_repo.list_movements(item_id)?)
    }

    /// 低库存: quantity <= safety_min + stock_low_margin
    pub fn list_low_stock(&self, ctx: &TenantContext) -> ApiResult<Vec<StockItem>> {
        let margin = self.config.get_stock_low_margin(&ctx.tenant_id)?;
        Ok(self
            .inventory_repo
            .list_items(&ctx.tenant_id)?
            .into_iter()
            .filter(|item| item.is_low(margin))
            .collect())
    }
}
