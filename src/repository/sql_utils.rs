// ==========================================
// 机组部件追踪系统 - 仓储行映射工具
// ==========================================
// 职责: 日期/时间戳/枚举列的统一读写格式
// 约束: 解析失败返回 FromSqlConversionFailure，不静默回退默认值
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rusqlite::types::Type;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
struct ColumnParseError(String);

impl fmt::Display for ColumnParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ColumnParseError {}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(ColumnParseError(message)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

pub fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| conversion_error(idx, format!("日期格式错误 '{}': {}", raw, e)))
}

pub fn parse_opt_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| parse_date(idx, &s)).transpose()
}

pub fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| conversion_error(idx, format!("时间戳格式错误 '{}': {}", raw, e)))
}

/// 按枚举自身的 from_db_str 解析列值
pub fn parse_enum<T>(idx: usize, raw: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| conversion_error(idx, format!("未知枚举值: {}", raw)))
}

/// 当前时间（秒级精度，与存储格式一致）
pub fn now_timestamp() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
