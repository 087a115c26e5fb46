// ==========================================
// 机组部件追踪系统 - 部件槽位领域模型
// ==========================================
// 槽位是机组上的固定安装位置（如 "Cylinder 03 - Spark Plug"）
// 槽位一经创建永不删除，只有已装部件与安装基线会变化
// ==========================================

use crate::domain::counter::{usage, EngineCounters};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ComponentGroup - 槽位分组
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentGroup {
    pub group_id: String,
    pub tenant_id: String,
    pub engine_id: String,
    pub name: String,
    pub sort_order: i32,
}

// ==========================================
// ComponentSlot - 部件槽位
// ==========================================
// 对齐: component_slot 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSlot {
    pub slot_id: String,
    pub tenant_id: String,
    pub engine_id: String,
    pub group_id: Option<String>,

    pub name: String,
    pub base_name: Option<String>, // 类型名（排序用）
    pub seq_no: i32,               // 序号（排序用）

    // ===== 已装部件（可为空槽） =====
    pub installed_part_id: Option<String>,
    pub serial_number: Option<String>,

    // ===== 安装基线 =====
    pub installed_on: Option<NaiveDate>,
    pub install_hours: i64,
    pub install_starts: i64,

    pub last_greased_on: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl ComponentSlot {
    /// 自安装以来运行小时（负值钳制为 0）
    pub fn current_usage_hours(&self, counters: &EngineCounters) -> i64 {
        usage(counters.hours, self.install_hours)
    }

    /// 自安装以来启动次数（负值钳制为 0）
    pub fn current_usage_starts(&self, counters: &EngineCounters) -> i64 {
        usage(counters.starts, self.install_starts)
    }

    pub fn is_empty(&self) -> bool {
        self.installed_part_id.is_none()
    }

    /// 覆写已装部件与全部四个安装基线
    ///
    /// 同参数重复调用结果不变
    pub fn apply_installation(&mut self, installation: &Installation) {
        self.installed_part_id = installation.part_id.clone();
        self.serial_number = installation.serial_number.clone();
        self.installed_on = Some(installation.installed_on);
        self.install_hours = installation.hours_at_install;
        self.install_starts = installation.starts_at_install;
    }

    /// 仅记录润滑日期，不触碰部件与基线
    pub fn record_lubrication(&mut self, date: NaiveDate) {
        self.last_greased_on = Some(date);
    }
}

// ==========================================
// Installation - 一次安装的参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub part_id: Option<String>,
    pub serial_number: Option<String>,
    pub installed_on: NaiveDate,
    pub hours_at_install: i64,
    pub starts_at_install: i64,
}


#[cfg(test)]
mod tests {
    use super::test_support::slot;
    use super::*;

    #[test]
    fn test_current_usage_非负() {
        let s = slot(1200, 80, None);
        let counters = EngineCounters::new(1000, 50);
        assert_eq!(s.current_usage_hours(&counters), 0);
        assert_eq!(s.current_usage_starts(&counters), 0);

        let counters = EngineCounters::new(1500, 90);
        assert_eq!(s.current_usage_hours(&counters), 300);
        assert_eq!(s.current_usage_starts(&counters), 10);
    }

    #[test]
    fn test_apply_installation_幂等() {
        let mut s = slot(800, 40, None);
        let inst = Installation {
            part_id: Some("part-turbo".to_string()),
            serial_number: Some("SN-1".to_string()),
            installed_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            hours_at_install: 1000,
            starts_at_install: 50,
        };

        s.apply_installation(&inst);
        let once = s.clone();
        s.apply_installation(&inst);

        assert_eq!(s, once);
        assert_eq!(s.install_hours, 1000);
        assert_eq!(s.current_usage_hours(&EngineCounters::new(1000, 50)), 0);
    }

    #[test]
    fn test_record_lubrication_不改基线() {
        let mut s = slot(800, 40, None);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        s.record_lubrication(date);

        assert_eq!(s.last_greased_on, Some(date));
        assert_eq!(s.install_hours, 800);
        assert!(s.is_empty());
    }
}
