// ==========================================
// 机组部件追踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id + key)
// 查找顺序: 租户作用域 → global → 编译期默认值
// ==========================================

use crate::config::maintenance_config_trait::MaintenanceConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 全局作用域 ID
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取单个作用域下的配置值
    pub fn get_scoped_value(&self, scope_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope_id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 租户作用域优先，回退 global
    pub fn get_effective_value(&self, tenant_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        if let Some(value) = self.get_scoped_value(tenant_id, key)? {
            return Ok(Some(value));
        }
        self.get_scoped_value(GLOBAL_SCOPE, key)
    }

    /// 写入配置（UPSERT）
    ///
    /// 已知键会做取值校验，非法值返回 ValidationError
    pub fn set_value(&self, scope_id: &str, key: &str, value: &str) -> RepositoryResult<()> {
        validate_known_key(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')
            "#,
            params![scope_id, key, value],
        )?;
        tracing::info!(scope_id, key, value, "配置已更新");
        Ok(())
    }

    /// 获取某作用域全部配置的快照（JSON）
    pub fn get_config_snapshot(&self, scope_id: &str) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let config_map = stmt
            .query_map(params![scope_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取正整数配置，缺失或非法时回退默认值
    fn get_i64_or_default(&self, tenant_id: &str, key: &str, default: i64) -> RepositoryResult<i64> {
        let Some(raw) = self.get_effective_value(tenant_id, key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<i64>() {
            Ok(v) if validate_known_key(key, &v.to_string()).is_ok() => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, default, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// MaintenanceConfigReader Trait 实现
// ==========================================
impl MaintenanceConfigReader for ConfigManager {
    fn get_plan_warning_pct(&self, tenant_id: &str) -> RepositoryResult<i64> {
        self.get_i64_or_default(tenant_id, config_keys::PLAN_WARNING_PCT, 90)
    }

    fn get_days_per_month(&self, tenant_id: &str) -> RepositoryResult<i64> {
        self.get_i64_or_default(tenant_id, config_keys::PLAN_DAYS_PER_MONTH, 30)
    }

    fn get_stock_low_margin(&self, tenant_id: &str) -> RepositoryResult<i64> {
        self.get_i64_or_default(tenant_id, config_keys::STOCK_LOW_MARGIN, 0)
    }
}

fn validate_known_key(key: &str, value: &str) -> RepositoryResult<()> {
    let parse = || {
        value.trim().parse::<i64>().map_err(|_| RepositoryError::FieldValueError {
            field: key.to_string(),
            message: format!("期望整数，实际 '{}'", value),
        })
    };

    let in_range = |v: i64, min: i64, max: i64| {
        if v < min || v > max {
            Err(RepositoryError::ValidationError(format!(
                "{} 取值 {} 超出范围 [{}, {}]",
                key, v, min, max
            )))
        } else {
            Ok(())
        }
    };

    match key {
        config_keys::PLAN_WARNING_PCT => in_range(parse()?, 1, 100),
        config_keys::PLAN_DAYS_PER_MONTH => in_range(parse()?, 1, 31),
        config_keys::STOCK_LOW_MARGIN => in_range(parse()?, 0, i64::from(i32::MAX)),
        _ => Ok(()),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 预防性计划
    pub const PLAN_WARNING_PCT: &str = "plan_warning_pct";
    pub const PLAN_DAYS_PER_MONTH: &str = "plan_days_per_month";

    // 库存
    pub const STOCK_LOW_MARGIN: &str = "stock_low_margin";
}
