// ==========================================
// 机组部件追踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / 引擎错误为调用方可修正的错误消息
// 约束: 所有错误信息必须包含显式原因（冲突值 / 机型名 / 在库数量）
// ==========================================

use crate::engine::error::MaintenanceError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 维护事件校验错误
    // ==========================================
    #[error("层级校验失败: 上报小时 {reported_hours} 大于机组累计小时 {engine_hours}")]
    HierarchyViolation { reported_hours: i64, engine_hours: i64 },

    #[error("部件不兼容: {part_name} 不适用于机型 {model_name}")]
    IncompatiblePart { part_name: String, model_name: String },

    #[error("库存不足: 在库 {available}, 需要 {required}")]
    InsufficientStock { available: i64, required: i64 },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无权访问: {0}")]
    PermissionDenied(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),
}

impl ApiError {
    /// 调用方可修正的错误（按 warn 记录，不计为系统故障）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::HierarchyViolation { .. }
                | ApiError::IncompatiblePart { .. }
                | ApiError::InsufficientStock { .. }
                | ApiError::InvalidInput(_)
                | ApiError::NotFound(_)
                | ApiError::PermissionDenied(_)
                | ApiError::BusinessRuleViolation(_)
                | ApiError::ValidationError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound(format!("{}(id={})不存在", entity, id)),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("名称或编码重复: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::CheckViolation(msg) => ApiError::ValidationError(msg),
            RepositoryError::ImmutableRecord(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 MaintenanceError 转换
// ==========================================
impl From<MaintenanceError> for ApiError {
    fn from(err: MaintenanceError) -> Self {
        match err {
            MaintenanceError::HierarchyViolation {
                reported_hours,
                engine_hours,
            } => ApiError::HierarchyViolation {
                reported_hours,
                engine_hours,
            },
            MaintenanceError::IncompatiblePart { part_name, model_name } => {
                ApiError::IncompatiblePart { part_name, model_name }
            }
            MaintenanceError::InsufficientStock { available, required } => {
                ApiError::InsufficientStock { available, required }
            }
            MaintenanceError::NotFound { entity, id } => ApiError::NotFound(format!("{}(id={})不存在", entity, id)),
            MaintenanceError::PermissionDenied { entity, id } => {
                ApiError::PermissionDenied(format!("{}(id={})不属于当前租户", entity, id))
            }
            MaintenanceError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            MaintenanceError::Repository(err) => ApiError::from(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 统一错误日志: 可修正错误记 warn，其余记 error
pub(crate) fn log_api_error(operation: &str, err: &ApiError) {
    if err.is_client_error() {
        tracing::warn!(operation, error = %err, "请求被拒绝");
    } else {
        tracing::error!(operation, error = %err, "请求失败");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_error_转换保留冲突值() {
        let err: ApiError = MaintenanceError::HierarchyViolation {
            reported_hours: 1001,
            engine_hours: 1000,
        }
        .into();
        assert!(matches!(
            err,
            ApiError::HierarchyViolation {
                reported_hours: 1001,
                engine_hours: 1000
            }
        ));
        assert!(err.to_string().contains("1001"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_repository_error_转换() {
        let err: ApiError = MaintenanceError::Repository(RepositoryError::not_found("Engine", "e1")).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
        assert!(!err.is_client_error());
    }
}
