// ==========================================
// 机组部件追踪系统 - 引擎层
// ==========================================
// 职责: 槽位登记、预防性计划状态、部件寿命、槽位生成、维护事件处理
// 红线: Engine 不拼 SQL，数据访问一律经由 repository
// ==========================================

pub mod error;
pub mod maintenance_processor;
pub mod part_life;
pub mod plan_status;
pub mod slot_provisioning;
pub mod slot_registry;

// 重导出核心引擎
pub use error::{MaintenanceError, MaintenanceResult};
pub use maintenance_processor::{MaintenanceEventProcessor, EVENT_ORIGIN_PREFIX};
pub use part_life::{evaluate_part_life, LifeUsage, PartLifeReport};
pub use plan_status::PreventivePlanEngine;
pub use slot_provisioning::{plan_slots, SlotProvisioner, SlotSpec};
pub use slot_registry::SlotRegistry;
