// ==========================================
// 机组部件追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与纯计算属性
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod asset;
pub mod component;
pub mod counter;
pub mod inventory;
pub mod maintenance;
pub mod plan;
pub mod tenant;
pub mod types;

// 重导出核心类型
pub use asset::{Engine, EngineModel, SlotQuantities};
pub use component::{ComponentGroup, ComponentSlot, Installation};
pub use counter::{usage, EngineCounters};
pub use inventory::{CatalogPart, StockItem, StockLocation, StockMovement};
pub use maintenance::{MaintenanceEvent, MaintenanceEventInput, ProcessOutcome};
pub use plan::{PlanDetail, PreventivePlan, StatusAlert};
pub use tenant::TenantContext;
pub use types::{ComponentCategory, MeasurementUnit, MovementType, PlanStatus, TriggerKind};
