// ==========================================
// 机组部件追踪系统 - API 层
// ==========================================
// 职责: 租户范围内的业务入口，输入校验与错误映射
// 约束: 每个公开操作显式接收 TenantContext
// ==========================================

pub mod asset_api;
pub mod component_api;
pub mod error;
pub mod inventory_api;
pub mod maintenance_api;
pub mod validator;

// 重导出核心类型
pub use asset_api::{AssetApi, CreateEngineRequest, CreateEngineResponse};
pub use component_api::{AddPlanRequest, ComponentApi, SlotAlerts, SlotReport};
pub use error::{ApiError, ApiResult};
pub use inventory_api::{InventoryApi, RegisterPartRequest};
pub use maintenance_api::MaintenanceApi;
