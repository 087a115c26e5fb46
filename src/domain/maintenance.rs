// ==========================================
// 机组部件追踪系统 - 维护事件领域模型
// ==========================================
// 维护事件是不可变的历史事实: 创建后永不修改、永不删除
// 对齐: maintenance_event 表（数据库触发器拒绝 UPDATE/DELETE）
// ==========================================

use crate::domain::types::TriggerKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceEvent - 维护事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub event_id: String,
    pub tenant_id: String,
    pub engine_id: String,
    pub slot_id: String,

    pub event_date: NaiveDate,
    pub trigger_kind: TriggerKind,
    pub hours_at_execution: i64,
    pub starts_at_execution: Option<i64>,

    // ===== 库存消耗 =====
    pub stock_item_id: Option<String>,
    pub quantity_used: i64, // 未扣减库存时为 0

    pub new_serial: Option<String>,
    pub note: String,
    pub responsible: String, // 责任人（操作用户）
    pub created_at: NaiveDateTime,
}

// ==========================================
// MaintenanceEventInput - 事件处理输入
// ==========================================
// 租户与操作用户由 TenantContext 单独传入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceEventInput {
    pub engine_id: String,
    pub slot_id: String,
    pub trigger_kind: TriggerKind,
    pub event_date: NaiveDate,
    pub hours_at_execution: i64,
    pub starts_at_execution: Option<i64>,
    pub stock_item_id: Option<String>,
    pub quantity: Option<i64>, // 显式数量，缺省取目录的每次安装消耗数量
    pub new_serial: Option<String>,
    pub note: Option<String>,
}

impl MaintenanceEventInput {
    /// 最小输入（其余字段为空）
    pub fn new(
        engine_id: impl Into<String>,
        slot_id: impl Into<String>,
        trigger_kind: TriggerKind,
        event_date: NaiveDate,
        hours_at_execution: i64,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            slot_id: slot_id.into(),
            trigger_kind,
            event_date,
            hours_at_execution,
            starts_at_execution: None,
            stock_item_id: None,
            quantity: None,
            new_serial: None,
            note: None,
        }
    }

    pub fn with_starts(mut self, starts: i64) -> Self {
        self.starts_at_execution = Some(starts);
        self
    }

    pub fn with_stock_item(mut self, item_id: impl Into<String>) -> Self {
        self.stock_item_id = Some(item_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.new_serial = Some(serial.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// ==========================================
// ProcessOutcome - 事件处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub event_id: String,
    pub event: MaintenanceEvent,
    pub updated_engine_hours: i64,
    pub updated_engine_starts: i64,
    pub plans_reset: Vec<String>,
    pub stock_decremented: bool,
}
