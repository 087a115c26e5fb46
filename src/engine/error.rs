// ==========================================
// 机组部件追踪系统 - 引擎层错误类型
// ==========================================
// 职责: 维护事件处理的显式失败原因
// 红线: 校验失败必须携带冲突值，调用方据此修正后重新提交
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    // ==========================================
    // 业务校验失败（整笔事务回滚）
    // ==========================================
    #[error("层级校验失败: 上报小时 {reported_hours} 大于机组累计小时 {engine_hours}")]
    HierarchyViolation { reported_hours: i64, engine_hours: i64 },

    #[error("部件不兼容: {part_name} 不适用于机型 {model_name}")]
    IncompatiblePart { part_name: String, model_name: String },

    #[error("库存不足: 在库 {available}, 需要 {required}")]
    InsufficientStock { available: i64, required: i64 },

    // ==========================================
    // 查找 / 权限
    // ==========================================
    #[error("{entity} 不存在: {id}")]
    NotFound { entity: String, id: String },

    #[error("无权访问 {entity}: {id}")]
    PermissionDenied { entity: String, id: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 底层错误（不重试，原样上抛）
    // ==========================================
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MaintenanceError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        MaintenanceError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn permission_denied(entity: &str, id: &str) -> Self {
        MaintenanceError::PermissionDenied {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 是否为调用方可修正的错误（不按系统故障记录）
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MaintenanceError::Repository(_))
    }
}

pub type MaintenanceResult<T> = Result<T, MaintenanceError>;
