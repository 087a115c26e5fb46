// ==========================================
// 机组部件追踪系统 - 部件寿命评估
// ==========================================
// 职责: 按部件目录的寿命上限（小时 / 启动 / 月）评估已装部件
// 规则: 取各项寿命中最差的分级，预警百分比取目录的 alert_pct
// ==========================================

use crate::domain::component::ComponentSlot;
use crate::domain::counter::EngineCounters;
use crate::domain::inventory::CatalogPart;
use crate::domain::types::{MeasurementUnit, PlanStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单项寿命的消耗情况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeUsage {
    pub unit: MeasurementUnit,
    pub used: i64,
    pub limit: i64,
    pub status: PlanStatus,
}

/// 部件寿命评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartLifeReport {
    pub part_id: String,
    pub part_name: String,
    pub worst_status: PlanStatus,
    pub usages: Vec<LifeUsage>,
}

/// 评估槽位上已装部件的寿命
///
/// 空槽或部件无寿命上限时返回 None
pub fn evaluate_part_life(
    slot: &ComponentSlot,
    part: &CatalogPart,
    counters: &EngineCounters,
    today: NaiveDate,
    days_per_month: i64,
) -> Option<PartLifeReport> {
    if slot.is_empty() || !part.has_life_limits() {
        return None;
    }

    let mut usages = Vec::new();
    let mut push = |unit: MeasurementUnit, used: i64, limit: i64| {
        usages.push(LifeUsage {
            unit,
            used,
            limit,
            status: PlanStatus::classify(used, limit, part.alert_pct),
        });
    };

    if let Some(limit) = part.life_hours {
        push(MeasurementUnit::Hours, slot.current_usage_hours(counters), limit);
    }
    if let Some(limit) = part.life_starts {
        push(MeasurementUnit::Starts, slot.current_usage_starts(counters), limit);
    }
    if let (Some(months), Some(installed_on)) = (part.life_months, slot.installed_on) {
        let days = (today - installed_on).num_days().max(0);
        push(MeasurementUnit::Months, days, months.saturating_mul(days_per_month));
    }

    let worst_status = usages
        .iter()
        .map(|u| u.status)
        .max()
        .unwrap_or(PlanStatus::Ok);

    Some(PartLifeReport {
        part_id: part.part_id.clone(),
        part_name: part.name.clone(),
        worst_status,
        usages,
    })
}
