// ==========================================
// 机组部件追踪系统 - API 输入与租户范围校验
// ==========================================
// 职责: 空值 / 负数校验；记录的租户归属校验
// 规则: 记录不存在 → NotFound；属于其他租户 → PermissionDenied
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::tenant::TenantContext;

/// 非空字符串校验，返回去除首尾空白后的值
pub fn require_non_empty(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

pub fn require_non_negative(field: &str, value: i64) -> ApiResult<()> {
    if value < 0 {
        return Err(ApiError::InvalidInput(format!("{}不能为负: {}", field, value)));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i64) -> ApiResult<()> {
    if value <= 0 {
        return Err(ApiError::InvalidInput(format!("{}必须 > 0: {}", field, value)));
    }
    Ok(())
}

/// 计划间隔 / 部件寿命上限的最大取值（小时、次数、天、月共用）
pub const MAX_INTERVAL_VALUE: i64 = 1_000_000;

/// 单台机组每类槽位的最大声明数量
pub const MAX_SLOT_QUANTITY: u32 = 64;

/// 正数且不超过上限
pub fn require_in_range(field: &str, value: i64, max: i64) -> ApiResult<()> {
    require_positive(field, value)?;
    if value > max {
        return Err(ApiError::InvalidInput(format!("{}超出上限 {}: {}", field, max, value)));
    }
    Ok(())
}

/// 租户范围解析
///
/// # 参数
/// - `record`: 仓储查询结果
/// - `tenant_of`: 取记录的租户 ID
pub fn scoped<T>(
    ctx: &TenantContext,
    record: Option<T>,
    tenant_of: impl Fn(&T) -> &str,
    entity: &str,
    id: &str,
) -> ApiResult<T> {
    let record = record.ok_or_else(|| ApiError::NotFound(format!("{}(id={})不存在", entity, id)))?;
    if !ctx.owns(tenant_of(&record)) {
        tracing::warn!(entity, id, tenant_id = %ctx.tenant_id, "跨租户访问被拒绝");
        return Err(ApiError::PermissionDenied(format!("{}(id={})不属于当前租户", entity, id)));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Rec {
        tenant_id: String,
    }

    #[test]
    fn test_scoped_三种结果() {
        let ctx = TenantContext::new("t1", "u1");
        let own = Some(Rec {
            tenant_id: "t1".to_string(),
        });
        let other = Some(Rec {
            tenant_id: "t2".to_string(),
        });

        assert!(scoped(&ctx, own, |r| r.tenant_id.as_str(), "Engine", "e1").is_ok());
        assert!(matches!(
            scoped(&ctx, other, |r| r.tenant_id.as_str(), "Engine", "e1"),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            scoped::<Rec>(&ctx, None, |r| r.tenant_id.as_str(), "Engine", "e1"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_require_non_empty_去除空白() {
        assert_eq!(require_non_empty("名称", "  G1 ").unwrap(), "G1");
        assert!(require_non_empty("名称", "   ").is_err());
        assert!(require_positive("间隔", 0).is_err());
        assert!(require_non_negative("小时", 0).is_ok());
    }

    #[test]
    fn test_require_in_range_上下限() {
        assert!(require_in_range("间隔", 1, MAX_INTERVAL_VALUE).is_ok());
        assert!(require_in_range("间隔", MAX_INTERVAL_VALUE, MAX_INTERVAL_VALUE).is_ok());
        assert!(matches!(
            require_in_range("间隔", MAX_INTERVAL_VALUE + 1, MAX_INTERVAL_VALUE),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(require_in_range("间隔", 0, MAX_INTERVAL_VALUE).is_err());
    }
}
