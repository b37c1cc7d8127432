//! Date, time and duration helpers behind the date built-ins.
//!
//! Dates travel through expressions as UTC unix timestamps in seconds, times
//! as seconds since midnight and durations as a number of seconds.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use verdict_core::Value;

const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
const DATE: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%H"];

/// Calendar unit accepted by `startOf` and `endOf`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DateUnit {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        let unit = match name {
            "s" | "second" | "seconds" => Self::Second,
            "m" | "minute" | "minutes" => Self::Minute,
            "h" | "hour" | "hours" => Self::Hour,
            "d" | "day" | "days" => Self::Day,
            "w" | "week" | "weeks" => Self::Week,
            "M" | "month" | "months" => Self::Month,
            "y" | "year" | "years" => Self::Year,
            _ => return None,
        };
        Some(unit)
    }
}

/// Parse `"now"`, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339
pub(crate) fn parse_date_time(text: &str) -> Result<NaiveDateTime, String> {
    if text == "now" {
        return Ok(Utc::now().naive_utc());
    }

    NaiveDateTime::parse_from_str(text, DATE_TIME)
        .or_else(|_| NaiveDate::parse_from_str(text, DATE).map(|d| d.and_time(NaiveTime::MIN)))
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.naive_utc()))
        .map_err(|_| format!("'{}' is not a valid date", text))
}

pub(crate) fn parse_time(text: &str) -> Result<NaiveTime, String> {
    if text == "now" {
        return Ok(Utc::now().naive_utc().time());
    }

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .or_else(|| NaiveDateTime::parse_from_str(text, DATE_TIME).ok().map(|dt| dt.time()))
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc().time()))
        .ok_or_else(|| format!("'{}' is not a valid time", text))
}

/// Parse durations such as `"90s"`, `"1h 30m"` or `"2 days"` into seconds
pub(crate) fn parse_duration(text: &str) -> Result<u64, String> {
    let invalid = || format!("'{}' is not a valid duration", text);
    let mut rest = text.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = rest[digits..].trim_start();

        let letters = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
        let seconds = unit_seconds(&rest[..letters]).ok_or_else(invalid)?;
        rest = rest[letters..].trim_start();

        total = amount
            .checked_mul(seconds)
            .and_then(|s| total.checked_add(s))
            .ok_or_else(invalid)?;
    }
    Ok(total)
}

fn unit_seconds(unit: &str) -> Option<u64> {
    let seconds = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        _ => return None,
    };
    Some(seconds)
}

/// A timestamp number or a date string as a UTC date time
pub(crate) fn to_date_time(value: &Value) -> Result<NaiveDateTime, String> {
    match value {
        Value::Number(seconds) => from_timestamp(*seconds),
        Value::String(text) => parse_date_time(text),
        other => Err(format!("expected a date, got {}", other.type_name())),
    }
}

fn from_timestamp(seconds: f64) -> Result<NaiveDateTime, String> {
    if !seconds.is_finite() {
        return Err(format!("{} is not a valid timestamp", seconds));
    }
    DateTime::from_timestamp(seconds.floor() as i64, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| format!("{} is out of the supported date range", seconds))
}

pub(crate) fn timestamp(date: NaiveDateTime) -> Value {
    Value::Number(date.and_utc().timestamp() as f64)
}

pub(crate) fn start_of(date: NaiveDateTime, unit: DateUnit) -> Option<NaiveDateTime> {
    let midnight = date.date().and_time(NaiveTime::MIN);
    match unit {
        DateUnit::Second => date.with_nanosecond(0),
        DateUnit::Minute => date.with_nanosecond(0)?.with_second(0),
        DateUnit::Hour => date.with_nanosecond(0)?.with_second(0)?.with_minute(0),
        DateUnit::Day => Some(midnight),
        DateUnit::Week => {
            midnight.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        }
        DateUnit::Month => midnight.with_day(1),
        DateUnit::Year => midnight.with_day(1)?.with_month(1),
    }
}

/// Last whole second of the period containing `date`
pub(crate) fn end_of(date: NaiveDateTime, unit: DateUnit) -> Option<NaiveDateTime> {
    let start = start_of(date, unit)?;
    let next = match unit {
        DateUnit::Second => return Some(start),
        DateUnit::Minute => start.checked_add_signed(chrono::Duration::minutes(1))?,
        DateUnit::Hour => start.checked_add_signed(chrono::Duration::hours(1))?,
        DateUnit::Day => start.checked_add_days(Days::new(1))?,
        DateUnit::Week => start.checked_add_days(Days::new(7))?,
        DateUnit::Month => start.checked_add_months(chrono::Months::new(1))?,
        DateUnit::Year => start.checked_add_months(chrono::Months::new(12))?,
    };
    next.checked_sub_signed(chrono::Duration::seconds(1))
}
