// ==========================================
// 机组部件追踪系统 - 计数器模型
// ==========================================
// 机组携带两个单调计数器: 累计运行小时 / 累计启动次数
// 其他所有计算都基于 usage(baseline) = max(0, current - baseline)
// ==========================================

use serde::{Deserialize, Serialize};

/// 基于基线的用量（负值钳制为 0，兼容录入不一致的历史数据）
pub fn usage(current: i64, baseline: i64) -> i64 {
    (current - baseline).max(0)
}

// ==========================================
// EngineCounters - 机组计数器快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineCounters {
    pub hours: i64,  // 累计运行小时
    pub starts: i64, // 累计启动次数
}

impl EngineCounters {
    pub fn new(hours: i64, starts: i64) -> Self {
        Self { hours, starts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_钳制为零() {
        assert_eq!(usage(1000, 800), 200);
        assert_eq!(usage(800, 1000), 0);
        assert_eq!(usage(0, 0), 0);
    }
}
