// ==========================================
// 机组部件追踪系统 - 应用层
// ==========================================
// 职责: 仓储 / 引擎 / API 的装配
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
