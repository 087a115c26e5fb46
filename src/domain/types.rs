// ==========================================
// 机组部件追踪系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 服务类型 (Trigger Kind)
// ==========================================
// 封闭集合: 维护事件与预防性计划通过它进行匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Replacement,      // 更换部件
    Installation,     // 新装部件
    Adjustment,       // 调整
    Lubrication,      // 润滑
    Calibration,      // 校准
    Inspection,       // 巡检
    Cleaning,         // 清洁
    CorrectiveRepair, // 故障修复（含换件）
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 8] = [
        TriggerKind::Replacement,
        TriggerKind::Installation,
        TriggerKind::Adjustment,
        TriggerKind::Lubrication,
        TriggerKind::Calibration,
        TriggerKind::Inspection,
        TriggerKind::Cleaning,
        TriggerKind::CorrectiveRepair,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TriggerKind::Replacement => "REPLACEMENT",
            TriggerKind::Installation => "INSTALLATION",
            TriggerKind::Adjustment => "ADJUSTMENT",
            TriggerKind::Lubrication => "LUBRICATION",
            TriggerKind::Calibration => "CALIBRATION",
            TriggerKind::Inspection => "INSPECTION",
            TriggerKind::Cleaning => "CLEANING",
            TriggerKind::CorrectiveRepair => "CORRECTIVE_REPAIR",
        }
    }

    /// 从数据库字符串解析（未知值返回 None，由调用方决定如何报错）
    pub fn from_db_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();
        TriggerKind::ALL
            .iter()
            .copied()
            .find(|k| k.to_db_str() == normalized)
    }

    /// 换件族: 整件更换使该槽位所有磨损跟踪失效，所有计划一并重置
    pub fn is_replacement_family(&self) -> bool {
        matches!(
            self,
            TriggerKind::Replacement | TriggerKind::Installation | TriggerKind::CorrectiveRepair
        )
    }

    /// 是否写入槽位安装基线（并触发兼容性校验与库存扣减）
    pub fn installs_part(&self) -> bool {
        matches!(self, TriggerKind::Replacement | TriggerKind::Installation)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 计量单位 (Measurement Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementUnit {
    Hours,  // 运行小时
    Starts, // 启动次数
    Days,   // 自然日
    Months, // 月（按 30 天近似）
}

impl MeasurementUnit {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Hours => "HOURS",
            MeasurementUnit::Starts => "STARTS",
            MeasurementUnit::Days => "DAYS",
            MeasurementUnit::Months => "MONTHS",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HOURS" => Some(MeasurementUnit::Hours),
            "STARTS" => Some(MeasurementUnit::Starts),
            "DAYS" => Some(MeasurementUnit::Days),
            "MONTHS" => Some(MeasurementUnit::Months),
            _ => None,
        }
    }

    /// 展示用单位后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            MeasurementUnit::Hours => "h",
            MeasurementUnit::Starts => "次",
            MeasurementUnit::Days | MeasurementUnit::Months => "天",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 计划状态 (Plan Status)
// ==========================================
// 顺序: Ok < Warning < Overdue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Ok,      // 正常
    Warning, // 临近
    Overdue, // 超期
}

impl PlanStatus {
    /// 按已用量 / 阈值 / 预警百分比分级
    ///
    /// 整数比较，避免 0.9 边界上的浮点误差: elapsed * 100 >= threshold * pct
    /// 乘积在 i128 中计算，任意 i64 输入都不会溢出
    pub fn classify(elapsed: i64, threshold: i64, warning_pct: i64) -> Self {
        if elapsed >= threshold {
            PlanStatus::Overdue
        } else if i128::from(elapsed) * 100 >= i128::from(threshold) * i128::from(warning_pct) {
            PlanStatus::Warning
        } else {
            PlanStatus::Ok
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, PlanStatus::Ok)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Ok => write!(f, "OK"),
            PlanStatus::Warning => write!(f, "WARNING"),
            PlanStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

// ==========================================
// 库存流水类型 (Movement Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,     // 入库（采购/退回）
    Out,    // 出库（消耗/损耗）
    Adjust, // 盘点调整
}

impl MovementType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjust => "ADJUST",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "IN" => Some(MovementType::In),
            "OUT" => Some(MovementType::Out),
            "ADJUST" => Some(MovementType::Adjust),
            _ => None,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 部件分组 (Component Category)
// ==========================================
// 槽位上的显式分组属性，列表筛选由展示层按此过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentCategory {
    OilSystem,
    Filters,
    Peripherals,
    Ignition,
    Cylinders,
    Other,
}

impl ComponentCategory {
    /// 分组显示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentCategory::OilSystem => "Oil System",
            ComponentCategory::Filters => "Filters",
            ComponentCategory::Peripherals => "Peripherals",
            ComponentCategory::Ignition => "Ignition / Electrical",
            ComponentCategory::Cylinders => "Cylinders",
            ComponentCategory::Other => "Other",
        }
    }

    /// 分组排序
    pub fn sort_order(&self) -> i32 {
        match self {
            ComponentCategory::OilSystem => 1,
            ComponentCategory::Filters => 2,
            ComponentCategory::Peripherals => 3,
            ComponentCategory::Ignition => 4,
            ComponentCategory::Cylinders => 5,
            ComponentCategory::Other => 7,
        }
    }
}
