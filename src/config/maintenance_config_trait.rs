// ==========================================
// 机组部件追踪系统 - 维护配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};

/// 计划状态分级阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusThresholds {
    /// WARNING 阈值（间隔的百分比）
    pub warning_pct: i64,
    /// MONTHS → 天 的换算（日历近似，不做真实月份运算）
    pub days_per_month: i64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            warning_pct: 90,
            days_per_month: 30,
        }
    }
}

// ==========================================
// MaintenanceConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取，租户作用域优先于 global）
pub trait MaintenanceConfigReader: Send + Sync {
    /// 获取计划预警百分比
    ///
    /// # 默认值
    /// - 90
    fn get_plan_warning_pct(&self, tenant_id: &str) -> RepositoryResult<i64>;

    /// 获取每月天数
    ///
    /// # 默认值
    /// - 30
    fn get_days_per_month(&self, tenant_id: &str) -> RepositoryResult<i64>;

    /// 获取低库存余量（在 safety_min 之上的额外余量）
    ///
    /// # 默认值
    /// - 0
    fn get_stock_low_margin(&self, tenant_id: &str) -> RepositoryResult<i64>;

    /// 组合读取状态分级阈值
    fn get_status_thresholds(&self, tenant_id: &str) -> RepositoryResult<StatusThresholds> {
        Ok(StatusThresholds {
            warning_pct: self.get_plan_warning_pct(tenant_id)?,
            days_per_month: self.get_days_per_month(tenant_id)?,
        })
    }
}
