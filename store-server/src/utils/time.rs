//! 时间工具函数 - 店铺时区转换
//!
//! 所有日期→时间戳转换统一在 service/handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 当前时间 (Unix millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析时区名称 (IANA, e.g. `Africa/Algiers`)
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// 店铺时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Unix millis → 店铺时区的日历日期
pub fn date_of_millis(millis: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00) → Unix millis (店铺时区)
///
/// DST gap fallback: 如果本地午夜不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (店铺时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// 解析查询下界: RFC 3339 时间点，或 `YYYY-MM-DD` (当天零点)
pub fn parse_lower_bound(value: &str, tz: Tz) -> AppResult<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    parse_date(value).map(|date| day_start_millis(date, tz))
}

/// 解析查询上界 (含)，返回不含的 millis 边界
///
/// `YYYY-MM-DD` 覆盖整天；RFC 3339 时间点本身也包含在内。
pub fn parse_upper_bound(value: &str, tz: Tz) -> AppResult<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis() + 1);
    }
    parse_date(value).map(|date| day_end_millis(date, tz))
}
