// ==========================================
// 机组部件追踪系统 - 租户上下文
// ==========================================
// 所有核心操作显式接收 TenantContext，核心内部不做任何全局/隐式租户查找
// 认证本身不在本系统范围内
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: String,
    pub user_id: String, // 操作用户
}

impl TenantContext {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }

    /// 记录是否属于当前租户
    pub fn owns(&self, record_tenant_id: &str) -> bool {
        self.tenant_id == record_tenant_id
    }
}
