// ==========================================
// 机组部件追踪系统 - 配置层
// ==========================================
// 职责: 系统配置管理,支持租户级覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod maintenance_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
pub use maintenance_config_trait::{MaintenanceConfigReader, StatusThresholds};
