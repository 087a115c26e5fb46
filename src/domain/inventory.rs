// ==========================================
// 机组部件追踪系统 - 库存领域模型
// ==========================================
// 部件目录定义部件“是什么、能用在哪、寿命多长”
// 库存条目记录某部件在某库位的实物数量
// ==========================================

use crate::domain::types::MovementType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CatalogPart - 部件目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPart {
    pub part_id: String,
    pub tenant_id: String,
    pub name: String,
    pub manufacturer_code: Option<String>,
    pub category: String,

    // ===== 兼容性 =====
    pub universal: bool,                  // 通用件: 忽略兼容机型列表
    pub compatible_model_ids: Vec<String>, // 兼容机型

    // ===== 追溯 =====
    pub requires_serial: bool,  // 安装时必须填写序列号
    pub units_per_install: i64, // 每次安装消耗数量

    // ===== 寿命 =====
    pub life_hours: Option<i64>,
    pub life_starts: Option<i64>,
    pub life_months: Option<i64>,
    pub alert_pct: i64, // 寿命预警百分比
}

impl CatalogPart {
    /// 是否可用于指定机型
    pub fn is_compatible_with(&self, model_id: &str) -> bool {
        self.universal || self.compatible_model_ids.iter().any(|m| m == model_id)
    }

    pub fn has_life_limits(&self) -> bool {
        self.life_hours.is_some() || self.life_starts.is_some() || self.life_months.is_some()
    }
}

// ==========================================
// StockLocation - 库位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub location_id: String,
    pub tenant_id: String,
    pub name: String,
}

// ==========================================
// StockItem - 库存条目 (部件 × 库位)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub item_id: String,
    pub tenant_id: String,
    pub part_id: String,
    pub location_id: String,
    pub quantity: i64,
    pub safety_min: i64,
}

impl StockItem {
    pub fn can_supply(&self, required: i64) -> bool {
        self.quantity >= required
    }

    pub fn is_low(&self, margin: i64) -> bool {
        self.quantity <= self.safety_min + margin
    }
}

// ==========================================
// StockMovement - 库存流水
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub movement_id: String,
    pub tenant_id: String,
    pub item_id: String,
    pub movement_type: MovementType,
    pub quantity: i64, // OUT 为消耗数量，ADJUST 为盘点后数量与原数量之差
    pub moved_at: NaiveDateTime,
    pub origin: Option<String>, // 如 "maintenance_event:<id>"
}
