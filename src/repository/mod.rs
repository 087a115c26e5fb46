// ==========================================
// 机组部件追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod asset_repo;
pub mod error;
pub mod inventory_repo;
pub mod maintenance_event_repo;
pub mod plan_repo;
pub mod slot_repo;
pub mod sql_utils;

// 重导出核心仓储
pub use asset_repo::EngineRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use maintenance_event_repo::MaintenanceEventRepository;
pub use plan_repo::PreventivePlanRepository;
pub use slot_repo::ComponentSlotRepository;
