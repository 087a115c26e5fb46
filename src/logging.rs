// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 环境变量:
// - RUST_LOG: 级别过滤（默认 info），例如 RUST_LOG=genset_tracker::engine=debug
// - GENSET_TRACKER_LOG_FORMAT: text（默认）或 json
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "GENSET_TRACKER_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json, // 部署到日志采集环境时使用，携带当前 span 字段（tenant_id / engine_id / slot_id）
}

impl LogFormat {
    /// 解析格式名，无法识别时回退 Text
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Text)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统（格式取自 GENSET_TRACKER_LOG_FORMAT）
///
/// # 示例
/// ```no_run
/// use genset_tracker::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 按指定格式初始化
pub fn init_with(format: LogFormat) {
    match format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .init(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter())
            .json()
            .with_current_span(true)
            .init(),
    }
}

/// 初始化测试环境的日志系统
///
/// debug 级别输出到测试 writer；重复调用安全
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
