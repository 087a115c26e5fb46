// ==========================================
// 机组部件追踪系统 - 预防性计划引擎
// ==========================================
// 职责: 计算单个槽位下每个计划的状态分级 (OK / WARNING / OVERDUE)
// 输入: 计划 + 槽位安装基线 + 机组当前计数器 + 当天日期
// 输出: PlanDetail / StatusAlert
// 红线: 纯计算，不访问数据库；重置只由维护事件处理器调用
// ==========================================

use crate::config::StatusThresholds;
use crate::domain::component::ComponentSlot;
use crate::domain::counter::{usage, EngineCounters};
use crate::domain::plan::{PlanDetail, PreventivePlan, StatusAlert};
use crate::domain::types::{MeasurementUnit, PlanStatus};
use chrono::NaiveDate;

// ==========================================
// PreventivePlanEngine - 预防性计划引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PreventivePlanEngine {
    thresholds: StatusThresholds,
}

impl PreventivePlanEngine {
    pub fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> StatusThresholds {
        self.thresholds
    }

    // ==========================================
    // 状态计算
    // ==========================================

    /// 计算单个计划的已用量与阈值
    ///
    /// # 规则
    /// - HOURS / STARTS: 基线为 last_value；为 0 且槽位安装基线 > 0 时改用安装基线
    /// - DAYS / MONTHS: 基线日期为 last_date，其次槽位安装日期，其次 today
    /// - MONTHS 阈值 = interval × days_per_month（日历近似，不做真实月份运算）
    pub fn elapsed_and_threshold(
        &self,
        plan: &PreventivePlan,
        slot: &ComponentSlot,
        counters: &EngineCounters,
        today: NaiveDate,
    ) -> (i64, i64) {
        match plan.unit {
            MeasurementUnit::Hours => {
                let base = counter_base(plan.last_value, slot.install_hours);
                (usage(counters.hours, base), plan.interval_value)
            }
            MeasurementUnit::Starts => {
                let base = counter_base(plan.last_value, slot.install_starts);
                (usage(counters.starts, base), plan.interval_value)
            }
            MeasurementUnit::Days => (elapsed_days(plan, slot, today), plan.interval_value),
            MeasurementUnit::Months => (
                elapsed_days(plan, slot, today),
                plan.interval_value.saturating_mul(self.thresholds.days_per_month),
            ),
        }
    }

    /// 单个计划的状态明细
    pub fn evaluate_plan(
        &self,
        plan: &PreventivePlan,
        slot: &ComponentSlot,
        counters: &EngineCounters,
        today: NaiveDate,
    ) -> PlanDetail {
        let (elapsed, threshold) = self.elapsed_and_threshold(plan, slot, counters, today);
        let status = PlanStatus::classify(elapsed, threshold, self.thresholds.warning_pct);
        let remaining = threshold - elapsed;

        // 不封顶: 超期计划显示 > 100
        let progress_pct = if threshold > 0 {
            elapsed as f64 / threshold as f64 * 100.0
        } else {
            0.0
        };

        let suffix = plan.unit.suffix();
        let remaining_label = if remaining >= 0 {
            format!("剩余 {}{}", remaining, suffix)
        } else {
            format!("超期 {}{}", -remaining, suffix)
        };

        PlanDetail {
            plan_id: plan.plan_id.clone(),
            task: plan.task.clone(),
            unit: plan.unit,
            status,
            elapsed,
            threshold,
            remaining,
            progress_pct,
            elapsed_label: format!("{}{}", elapsed, suffix),
            remaining_label,
        }
    }

    /// 槽位下全部计划的明细（含 OK）
    pub fn detailed_report(
        &self,
        plans: &[PreventivePlan],
        slot: &ComponentSlot,
        counters: &EngineCounters,
        today: NaiveDate,
    ) -> Vec<PlanDetail> {
        plans
            .iter()
            .map(|p| self.evaluate_plan(p, slot, counters, today))
            .collect()
    }

    /// 告警汇总: 只保留 WARNING / OVERDUE
    pub fn status_summary(
        &self,
        plans: &[PreventivePlan],
        slot: &ComponentSlot,
        counters: &EngineCounters,
        today: NaiveDate,
    ) -> Vec<StatusAlert> {
        self.detailed_report(plans, slot, counters, today)
            .into_iter()
            .filter(|d| d.status.is_alert())
            .map(|d| StatusAlert {
                plan_id: d.plan_id,
                task: d.task,
                status: d.status,
            })
            .collect()
    }

    // ==========================================
    // 重置
    // ==========================================

    /// 重置计划基线
    ///
    /// `starts_at_execution` 缺省时使用机组当前启动次数
    pub fn reset_plan(
        &self,
        plan: &mut PreventivePlan,
        execution_date: NaiveDate,
        hours_at_execution: i64,
        starts_at_execution: Option<i64>,
        counters: &EngineCounters,
    ) {
        let starts = starts_at_execution.unwrap_or(counters.starts);
        plan.reset(execution_date, hours_at_execution, starts);
    }
}

fn counter_base(last_value: i64, install_baseline: i64) -> i64 {
    if last_value == 0 && install_baseline > 0 {
        install_baseline
    } else {
        last_value
    }
}

/// 基线日期之后的天数（未来基线钳制为 0）
fn elapsed_days(plan: &PreventivePlan, slot: &ComponentSlot, today: NaiveDate) -> i64 {
    let base_date = plan.last_date.or(slot.installed_on).unwrap_or(today);
    (today - base_date).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::component::test_support::slot;
    use crate::domain::types::TriggerKind;

    fn plan(unit: MeasurementUnit, interval: i64, last_value: i64, last_date: Option<NaiveDate>) -> PreventivePlan {
        PreventivePlan {
            plan_id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            slot_id: "slot-1".to_string(),
            task: "Troca de óleo".to_string(),
            trigger_kind: TriggerKind::Replacement,
            unit,
            interval_value: interval,
            last_value,
            last_date,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_hours_计划_90百分比进入_warning() {
        let engine = PreventivePlanEngine::default();
        let p = plan(MeasurementUnit::Hours, 500, 0, None);
        let s = slot(100, 0, None);

        let detail = engine.evaluate_plan(&p, &s, &EngineCounters::new(550, 0), d(2024, 1, 1));
        assert_eq!(detail.elapsed, 450);
        assert_eq!(detail.status, PlanStatus::Warning);
        assert_eq!(detail.remaining, 50);
        assert!((detail.progress_pct - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_hours_基线非零时忽略安装基线() {
        let engine = PreventivePlanEngine::default();
        let p = plan(MeasurementUnit::Hours, 500, 400, None);
        let s = slot(100, 0, None);

        let detail = engine.evaluate_plan(&p, &s, &EngineCounters::new(550, 0), d(2024, 1, 1));
        assert_eq!(detail.elapsed, 150);
        assert_eq!(detail.status, PlanStatus::Ok);
    }

    #[test]
    fn test_starts_计划_超期进度大于100() {
        let engine = PreventivePlanEngine::default();
        let p = plan(MeasurementUnit::Starts, 100, 0, None);
        let s = slot(0, 20, None);

        let detail = engine.evaluate_plan(&p, &s, &EngineCounters::new(0, 170), d(2024, 1, 1));
        assert_eq!(detail.elapsed, 150);
        assert_eq!(detail.status, PlanStatus::Overdue);
        assert_eq!(detail.remaining, -50);
        assert!(detail.progress_pct > 100.0);
        assert!(detail.remaining_label.starts_with("超期"));
    }

    #[test]
    fn test_days_基线回退顺序() {
        let engine = PreventivePlanEngine::default();
        let today = d(2024, 3, 31);

        // last_date 优先
        let p = plan(MeasurementUnit::Days, 30, 0, Some(d(2024, 3, 1)));
        let s = slot(0, 0, Some(d(2024, 1, 1)));
        assert_eq!(engine.evaluate_plan(&p, &s, &EngineCounters::default(), today).elapsed, 30);

        // 其次安装日期
        let p = plan(MeasurementUnit::Days, 30, 0, None);
        assert_eq!(engine.evaluate_plan(&p, &s, &EngineCounters::default(), today).elapsed, 90);

        // 都没有时取 today
        let s = slot(0, 0, None);
        let detail = engine.evaluate_plan(&p, &s, &EngineCounters::default(), today);
        assert_eq!(detail.elapsed, 0);
        assert_eq!(detail.status, PlanStatus::Ok);
    }

    #[test]
    fn test_months_按30天换算() {
        let engine = PreventivePlanEngine::default();
        let p = plan(MeasurementUnit::Months, 6, 0, Some(d(2024, 1, 1)));
        let s = slot(0, 0, None);

        // 2024-01-01 + 162 天 = 2024-06-11, 162 / 180 = 90%
        let detail = engine.evaluate_plan(&p, &s, &EngineCounters::default(), d(2024, 6, 11));
        assert_eq!(detail.threshold, 180);
        assert_eq!(detail.elapsed, 162);
        assert_eq!(detail.status, PlanStatus::Warning);
    }

    #[test]
    fn test_months_自定义每月天数() {
        let engine = PreventivePlanEngine::new(StatusThresholds {
            warning_pct: 80,
            days_per_month: 31,
        });
        let p = plan(MeasurementUnit::Months, 1, 0, Some(d(2024, 1, 1)));
        let detail = engine.evaluate_plan(&p, &slot(0, 0, None), &EngineCounters::default(), d(2024, 1, 26));
        assert_eq!(detail.threshold, 31);
        assert_eq!(detail.status, PlanStatus::Warning);
    }

    #[test]
    fn test_极大间隔不溢出() {
        let engine = PreventivePlanEngine::default();
        let huge = i64::MAX / 10;
        let s = slot(100, 0, Some(d(2024, 1, 1)));

        let hours = engine.evaluate_plan(
            &plan(MeasurementUnit::Hours, huge, 0, None),
            &s,
            &EngineCounters::new(550, 0),
            d(2024, 6, 1),
        );
        assert_eq!(hours.status, PlanStatus::Ok);

        let months = engine.evaluate_plan(
            &plan(MeasurementUnit::Months, huge, 0, None),
            &s,
            &EngineCounters::default(),
            d(2024, 6, 1),
        );
        assert_eq!(months.threshold, i64::MAX);
        assert_eq!(months.status, PlanStatus::Ok);
    }

    #[test]
    fn test_starts_基线非零时忽略安装基线() {
        let engine = PreventivePlanEngine::default();
        let s = slot(0, 20, None);
        let counters = EngineCounters::new(0, 170);

        // last_value = 0 → 回退到安装启动次数 20
        let fallback = engine.evaluate_plan(&plan(MeasurementUnit::Starts, 200, 0, None), &s, &counters, d(2024, 1, 1));
        assert_eq!(fallback.elapsed, 150);

        // last_value 非零 → 直接使用
        let explicit = engine.evaluate_plan(&plan(MeasurementUnit::Starts, 200, 100, None), &s, &counters, d(2024, 1, 1));
        assert_eq!(explicit.elapsed, 70);
        assert_eq!(explicit.status, PlanStatus::Ok);
    }

    #[test]
    fn test_reset_后状态为_ok() {
        let engine = PreventivePlanEngine::default();
        let counters = EngineCounters::new(1000, 50);
        let s = slot(800, 40, None);
        let today = d(2024, 5, 1);

        let mut hours = plan(MeasurementUnit::Hours, 500, 0, None);
        let mut starts = plan(MeasurementUnit::Starts, 20, 0, None);
        starts.plan_id = "p2".to_string();

        engine.reset_plan(&mut hours, today, 1000, None, &counters);
        engine.reset_plan(&mut starts, today, 1000, None, &counters);
        assert_eq!(starts.last_value, 50, "缺省启动次数取机组当前值");

        let plans = vec![hours, starts];
        let report = engine.detailed_report(&plans, &s, &counters, today);
        assert!(report.iter().all(|d| d.elapsed == 0 && d.status == PlanStatus::Ok));
        assert!(engine.status_summary(&plans, &s, &counters, today).is_empty());
    }

    #[test]
    fn test_status_summary_只保留告警() {
        let engine = PreventivePlanEngine::default();
        let s = slot(0, 0, None);
        let counters = EngineCounters::new(600, 0);

        let mut ok = plan(MeasurementUnit::Hours, 1000, 0, None);
        ok.plan_id = "ok".to_string();
        let mut overdue = plan(MeasurementUnit::Hours, 500, 0, None);
        overdue.plan_id = "overdue".to_string();

        let alerts = engine.status_summary(&[ok, overdue], &s, &counters, d(2024, 1, 1));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].plan_id, "overdue");
        assert_eq!(alerts[0].status, PlanStatus::Overdue);
    }
}
