use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::utils::error::{RatesError, Result};

/// 上游使用的日期格式
pub const UPSTREAM_DATE_FORMAT: &str = "%d-%m-%Y";

/// Europe/Istanbul has been fixed at UTC+3 since 2016.
const ISTANBUL_OFFSET_HOURS: i64 = 3;

pub fn today_in_istanbul() -> NaiveDate {
    (Utc::now() + Duration::hours(ISTANBUL_OFFSET_HOURS)).date_naive()
}

pub fn to_upstream(date: NaiveDate) -> String {
    date.format(UPSTREAM_DATE_FORMAT).to_string()
}

/// `DD-MM-YYYY` -> NaiveDate；格式不符回傳 None
pub fn parse_upstream(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), UPSTREAM_DATE_FORMAT).ok()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_iso_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RatesError::validation(format!("{} is required", field_name)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| {
            RatesError::validation(format!(
                "{} must be an ISO date (YYYY-MM-DD), got '{}'",
                field_name, value
            ))
        })
}

/// 查詢上游時的日期區間 (含頭尾)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[end - days, end]`
    pub fn last_days(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn start_param(&self) -> String {
        to_upstream(self.start)
    }

    pub fn end_param(&self) -> String {
        to_upstream(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_to_upstream_format() {
        let date = parse_iso_date("startDate", "2024-01-05").unwrap();
        assert_eq!(to_upstream(date), "05-01-2024");
    }

    #[test]
    fn test_parse_iso_accepts_rfc3339() {
        let date = parse_iso_date("endDate", "2024-03-10T12:00:00Z").unwrap();
        assert_eq!(to_upstream(date), "10-03-2024");
    }

    #[test]
    fn test_parse_iso_rejects_garbage() {
        assert!(parse_iso_date("startDate", "").is_err());
        assert!(parse_iso_date("startDate", "05-01-2024").is_err());
        assert!(parse_iso_date("startDate", "yesterday").is_err());
    }

    #[test]
    fn test_parse_upstream() {
        assert_eq!(
            parse_upstream("02-01-2024"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_upstream("2024-01-02"), None);
        assert_eq!(parse_upstream("31-02-2024"), None);
    }

    #[test]
    fn test_last_days_range() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = DateRange::last_days(end, 30);
        assert_eq!(range.start_param(), "31-01-2024");
        assert_eq!(range.end_param(), "01-03-2024");
    }
}
