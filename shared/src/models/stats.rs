//! Statistics period selector

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of calendar days in the daily sales breakdown
pub const DAILY_SALES_DAYS: i64 = 7;

/// Period selector for statistics queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Today,
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    /// Lenient parse: anything unknown falls back to `Today`
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("week") => StatsPeriod::Week,
            Some("month") => StatsPeriod::Month,
            Some("year") => StatsPeriod::Year,
            _ => StatsPeriod::Today,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Today => "today",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
        }
    }

    /// Half-open calendar range `[start, end)` for this period
    pub fn date_bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let tomorrow = today + Duration::days(1);
        match self {
            StatsPeriod::Today => (today, tomorrow),
            StatsPeriod::Week => (today - Duration::days(7), tomorrow),
            StatsPeriod::Month => {
                let start = today.with_day(1).unwrap_or(today);
                (start, first_of_next_month(start))
            }
            StatsPeriod::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(tomorrow);
                (start, end)
            }
        }
    }
}

fn first_of_next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

/// The last `DAILY_SALES_DAYS` calendar days ending with `today`, oldest first
pub fn trailing_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..DAILY_SALES_DAYS)
        .rev()
        .map(|back| today - Duration::days(back))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(StatsPeriod::parse_lenient(None), StatsPeriod::Today);
        assert_eq!(StatsPeriod::parse_lenient(Some("week")), StatsPeriod::Week);
        assert_eq!(StatsPeriod::parse_lenient(Some("month")), StatsPeriod::Month);
        assert_eq!(StatsPeriod::parse_lenient(Some("year")), StatsPeriod::Year);
        assert_eq!(
            StatsPeriod::parse_lenient(Some("decade")),
            StatsPeriod::Today
        );
    }

    #[test]
    fn test_today_bounds() {
        let today = date(2024, 3, 15);
        assert_eq!(
            StatsPeriod::Today.date_bounds(today),
            (date(2024, 3, 15), date(2024, 3, 16))
        );
    }

    #[test]
    fn test_week_bounds_go_seven_days_back() {
        let today = date(2024, 3, 3);
        assert_eq!(
            StatsPeriod::Week.date_bounds(today),
            (date(2024, 2, 25), date(2024, 3, 4))
        );
    }

    #[test]
    fn test_month_bounds_in_december() {
        let today = date(2024, 12, 31);
        assert_eq!(
            StatsPeriod::Month.date_bounds(today),
            (date(2024, 12, 1), date(2025, 1, 1))
        );
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let today = date(2024, 2, 10);
        assert_eq!(
            StatsPeriod::Month.date_bounds(today),
            (date(2024, 2, 1), date(2024, 3, 1))
        );
    }

    #[test]
    fn test_year_bounds() {
        let today = date(2024, 7, 4);
        assert_eq!(
            StatsPeriod::Year.date_bounds(today),
            (date(2024, 1, 1), date(2025, 1, 1))
        );
    }

    #[test]
    fn test_trailing_days() {
        let days = trailing_days(date(2024, 3, 2));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2024, 2, 25));
        assert_eq!(days[6], date(2024, 3, 2));
    }
}
