// ==========================================
// 机组部件追踪系统 - 机组领域模型
// ==========================================
// Engine 为聚合根: 一台实体发电机组
// 不变量: 累计小时 / 启动次数只增不减（管理性修正不在本系统范围内）
// ==========================================

use crate::domain::counter::EngineCounters;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// EngineModel - 机型（品牌 + 型号）
// ==========================================
// 用于部件兼容性校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineModel {
    pub model_id: String,
    pub tenant_id: String,
    pub brand: String, // 品牌
    pub name: String,  // 型号
}

impl EngineModel {
    /// 展示名: "{brand} - {name}"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.brand, self.name)
    }
}

// ==========================================
// SlotQuantities - 声明的槽位数量
// ==========================================
// 建机时据此生成槽位；对齐 engine.slot_quantities_json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuantities {
    pub cylinders: u32,

    // ===== 油路 =====
    pub oil_filters: u32,
    pub oil_coolers: u32,

    // ===== 外围 =====
    pub turbos: u32,
    pub intercoolers: u32,
    pub alternators: u32,
    pub dampers: u32,
    pub exhaust_compensators: u32,
    pub heaters: u32,
    pub bypass_valves: u32,
    pub starter_motors: u32,

    // ===== 滤清器 =====
    pub air_filters: u32,
    pub pre_air_filters: u32,
    pub gas_filters: u32,

    // ===== 点火 / 电气 =====
    pub batteries: u32,
    pub ignition_coils: u32,
    pub plug_cables: u32,
}

impl Default for SlotQuantities {
    fn default() -> Self {
        Self {
            cylinders: 12,
            oil_filters: 1,
            oil_coolers: 1,
            turbos: 2,
            intercoolers: 2,
            alternators: 1,
            dampers: 1,
            exhaust_compensators: 1,
            heaters: 1,
            bypass_valves: 1,
            starter_motors: 1,
            air_filters: 2,
            pre_air_filters: 0,
            gas_filters: 0,
            batteries: 2,
            ignition_coils: 0,
            plug_cables: 0,
        }
    }
}

impl SlotQuantities {
    /// 按缸数补齐: 每缸一件的部件数量为 0 时取缸数（仅建机时调用）
    pub fn with_cylinder_defaults(mut self) -> Self {
        if self.ignition_coils == 0 {
            self.ignition_coils = self.cylinders;
        }
        if self.plug_cables == 0 {
            self.plug_cables = self.cylinders;
        }
        self
    }

    /// 各声明数量（字段名, 值），用于上限校验
    pub fn entries(&self) -> [(&'static str, u32); 17] {
        [
            ("cylinders", self.cylinders),
            ("oil_filters", self.oil_filters),
            ("oil_coolers", self.oil_coolers),
            ("turbos", self.turbos),
            ("intercoolers", self.intercoolers),
            ("alternators", self.alternators),
            ("dampers", self.dampers),
            ("exhaust_compensators", self.exhaust_compensators),
            ("heaters", self.heaters),
            ("bypass_valves", self.bypass_valves),
            ("starter_motors", self.starter_motors),
            ("air_filters", self.air_filters),
            ("pre_air_filters", self.pre_air_filters),
            ("gas_filters", self.gas_filters),
            ("batteries", self.batteries),
            ("ignition_coils", self.ignition_coils),
            ("plug_cables", self.plug_cables),
        ]
    }
}

// ==========================================
// Engine - 机组
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    pub engine_id: String,
    pub tenant_id: String,
    pub name: String,
    pub model_id: String,
    pub serial_number: String,
    pub location: String,

    // ===== 运行计数器 =====
    pub hours_total: i64,  // 累计运行小时
    pub starts_total: i64, // 累计启动次数
    pub in_operation: bool,

    pub slot_quantities: SlotQuantities,
    pub created_at: NaiveDateTime,
}

impl Engine {
    /// 当前计数器快照
    pub fn counters(&self) -> EngineCounters {
        EngineCounters::new(self.hours_total, self.starts_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_cylinder_defaults_按缸数补齐() {
        let q = SlotQuantities {
            cylinders: 16,
            ignition_coils: 0,
            plug_cables: 8,
            ..SlotQuantities::default()
        }
        .with_cylinder_defaults();

        assert_eq!(q.ignition_coils, 16);
        assert_eq!(q.plug_cables, 8, "已声明的数量不应被覆盖");
    }
}
