// ==========================================
// 机组部件追踪系统 - 核心库
// ==========================================
// 系统定位: 多租户发电机组部件追踪
// - 哪个部件装在哪个槽位、累计了多少小时 / 启动次数
// - 预防性维护何时到期
// - 维护事件的事务性处理
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ComponentCategory, MeasurementUnit, MovementType, PlanStatus, TriggerKind};

// 领域实体
pub use domain::{
    CatalogPart, ComponentSlot, Engine, EngineCounters, EngineModel, MaintenanceEvent,
    MaintenanceEventInput, PreventivePlan, ProcessOutcome, SlotQuantities, StockItem, TenantContext,
};

// 引擎
pub use engine::{MaintenanceError, MaintenanceEventProcessor, PreventivePlanEngine, SlotProvisioner, SlotRegistry};

// API
pub use api::{ApiError, ApiResult, AssetApi, ComponentApi, InventoryApi, MaintenanceApi};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "机组部件追踪系统";
