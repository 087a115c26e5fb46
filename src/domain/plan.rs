// ==========================================
// 机组部件追踪系统 - 预防性维护计划领域模型
// ==========================================
// 每个计划绑定唯一一个槽位，由唯一一种计量单位控制
// 基线语义随单位不同:
// - HOURS / STARTS: last_value 为上次执行时的计数器值
// - DAYS / MONTHS: 仅 last_date 有意义
// ==========================================

use crate::domain::types::{MeasurementUnit, PlanStatus, TriggerKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PreventivePlan - 预防性计划
// ==========================================
// 对齐: preventive_plan 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreventivePlan {
    pub plan_id: String,
    pub tenant_id: String,
    pub slot_id: String,

    pub task: String,              // 任务名
    pub trigger_kind: TriggerKind, // 重置触发的服务类型
    pub unit: MeasurementUnit,
    pub interval_value: i64, // 间隔（正整数）

    // ===== 上次执行基线 =====
    pub last_value: i64,
    pub last_date: Option<NaiveDate>,
}

impl PreventivePlan {
    /// 重置执行基线
    ///
    /// # 参数
    /// - `execution_date`: 执行日期
    /// - `hours_at_execution`: 执行时运行小时
    /// - `starts_at_execution`: 执行时启动次数（调用方已用机组当前值补齐）
    pub fn reset(&mut self, execution_date: NaiveDate, hours_at_execution: i64, starts_at_execution: i64) {
        self.last_date = Some(execution_date);
        match self.unit {
            MeasurementUnit::Hours => self.last_value = hours_at_execution,
            MeasurementUnit::Starts => self.last_value = starts_at_execution,
            MeasurementUnit::Days | MeasurementUnit::Months => {}
        }
    }

    /// 该计划是否被某类事件重置
    pub fn is_reset_by(&self, kind: TriggerKind) -> bool {
        kind.is_replacement_family() || self.trigger_kind == kind
    }
}

// ==========================================
// PlanDetail - 单个计划的状态明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetail {
    pub plan_id: String,
    pub task: String,
    pub unit: MeasurementUnit,
    pub status: PlanStatus,
    pub elapsed: i64,   // 已用量（小时/次/天）
    pub threshold: i64, // 阈值（MONTHS 已换算为天）
    pub remaining: i64, // 剩余量，超期为负
    pub progress_pct: f64,
    pub elapsed_label: String,
    pub remaining_label: String,
}

// ==========================================
// StatusAlert - 告警条目（仅 WARNING / OVERDUE）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAlert {
    pub plan_id: String,
    pub task: String,
    pub status: PlanStatus,
}
