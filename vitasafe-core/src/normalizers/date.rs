// vitasafe-core/src/normalizers/date.rs
//! Date normalization.
//!
//! Accepted inputs: `{year, month?, day?}` objects, a bare integer year, or one of the
//! string shapes `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `MM/DD/YYYY`, `MM/YYYY`,
//! `Month YYYY`, `Month D, YYYY` and the sentinels `present|current|now|ongoing`.
//! Output is `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `Present`. Nothing else is guessed at:
//! compact or ambiguous numeric strings are format errors.
//!
//! License: MIT OR APACHE 2.0

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

use super::{FieldKind, NormalizeContext, Normalized, Normalizer};
use crate::diagnostics::ErrorCode;

pub const PRESENT: &str = "Present";

static SENTINEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:present|current|now|ongoing)$").expect("valid regex"));
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[T ]\d{2}:\d{2}").expect("valid regex")
});
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("valid regex"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));
static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));
static MONTH_SLASH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("valid regex"));
static NAMED_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{4})$").expect("valid regex"));
static NAMED_MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$").expect("valid regex")
});

/// A successfully parsed date at whatever precision the input had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialDate {
    Year(i32),
    YearMonth(i32, u32),
    Full(i32, u32, u32),
    Present,
}

impl PartialDate {
    pub fn canonical(&self) -> String {
        match self {
            PartialDate::Year(y) => format!("{:04}", y),
            PartialDate::YearMonth(y, m) => format!("{:04}-{:02}", y, m),
            PartialDate::Full(y, m, d) => format!("{:04}-{:02}-{:02}", y, m, d),
            PartialDate::Present => PRESENT.to_string(),
        }
    }

    fn parts(&self) -> Option<(i32, Option<u32>, Option<u32>)> {
        match *self {
            PartialDate::Year(y) => Some((y, None, None)),
            PartialDate::YearMonth(y, m) => Some((y, Some(m), None)),
            PartialDate::Full(y, m, d) => Some((y, Some(m), Some(d))),
            PartialDate::Present => None,
        }
    }

    /// Compares two dates at the precision both share. `Present` is later than any date.
    pub fn compare(&self, other: &PartialDate) -> Ordering {
        match (self.parts(), other.parts()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some((y1, m1, d1)), Some((y2, m2, d2))) => y1
                .cmp(&y2)
                .then_with(|| match (m1, m2) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => Ordering::Equal,
                })
                .then_with(|| match (d1, d2) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => Ordering::Equal,
                }),
        }
    }
}

/// Why a value could not be read as a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateProblem {
    /// Not one of the accepted shapes.
    Format,
    /// Right shape, impossible calendar values.
    OutOfRange,
    /// A timestamp. Carries the date part, which is a confident correction.
    HasTime(String),
    /// Not a string, number or object.
    WrongType,
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn year_month(year: i32, month: u32) -> Result<PartialDate, DateProblem> {
    if (1..=12).contains(&month) {
        Ok(PartialDate::YearMonth(year, month))
    } else {
        Err(DateProblem::OutOfRange)
    }
}

fn full_date(year: i32, month: u32, day: u32) -> Result<PartialDate, DateProblem> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|_| PartialDate::Full(year, month, day))
        .ok_or(DateProblem::OutOfRange)
}

fn num<T: std::str::FromStr>(caps: &regex::Captures<'_>, i: usize) -> Result<T, DateProblem> {
    caps[i].parse::<T>().map_err(|_| DateProblem::Format)
}

fn year(caps: &regex::Captures<'_>, i: usize) -> Result<i32, DateProblem> {
    four_digit_year(num(caps, i)?)
}

/// Parses a date string in one of the accepted shapes.
pub fn parse_date_str(text: &str) -> Result<PartialDate, DateProblem> {
    let text = text.trim();

    if SENTINEL.is_match(text) {
        return Ok(PartialDate::Present);
    }
    if let Some(caps) = TIMESTAMP.captures(text) {
        let date = full_date(year(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
        return Err(DateProblem::HasTime(date.canonical()));
    }
    if let Some(caps) = YEAR.captures(text) {
        return Ok(PartialDate::Year(year(&caps, 1)?));
    }
    if let Some(caps) = YEAR_MONTH.captures(text) {
        return year_month(year(&caps, 1)?, num(&caps, 2)?);
    }
    if let Some(caps) = ISO_DATE.captures(text) {
        return full_date(year(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
    }
    if let Some(caps) = US_DATE.captures(text) {
        return full_date(year(&caps, 3)?, num(&caps, 1)?, num(&caps, 2)?);
    }
    if let Some(caps) = MONTH_SLASH_YEAR.captures(text) {
        return year_month(year(&caps, 2)?, num(&caps, 1)?);
    }
    if let Some(caps) = NAMED_MONTH_YEAR.captures(text) {
        let month = month_from_name(&caps[1]).ok_or(DateProblem::Format)?;
        return year_month(year(&caps, 2)?, month);
    }
    if let Some(caps) = NAMED_MONTH_DAY_YEAR.captures(text) {
        let month = month_from_name(&caps[1]).ok_or(DateProblem::Format)?;
        return full_date(year(&caps, 3)?, month, num(&caps, 2)?);
    }

    Err(DateProblem::Format)
}

fn component(value: &Value) -> Result<i64, DateProblem> {
    match value {
        Value::Number(n) => n.as_i64().ok_or(DateProblem::Format),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| DateProblem::Format),
        _ => Err(DateProblem::Format),
    }
}

fn four_digit_year(year: i64) -> Result<i32, DateProblem> {
    if (1000..=9999).contains(&year) {
        Ok(year as i32)
    } else {
        Err(DateProblem::Format)
    }
}

fn in_u32(v: i64) -> Result<u32, DateProblem> {
    u32::try_from(v).map_err(|_| DateProblem::OutOfRange)
}

/// Parses any accepted raw date value.
pub fn parse_date_value(raw: &Value) -> Result<PartialDate, DateProblem> {
    match raw {
        Value::String(s) => parse_date_str(s),
        Value::Number(_) => four_digit_year(component(raw)?).map(PartialDate::Year),
        Value::Object(map) => {
            let year = four_digit_year(component(map.get("year").ok_or(DateProblem::Format)?)?)?;
            let month = map.get("month").filter(|v| !v.is_null()).map(component).transpose()?;
            let day = map.get("day").filter(|v| !v.is_null()).map(component).transpose()?;
            match (month, day) {
                (None, None) => Ok(PartialDate::Year(year)),
                (Some(m), None) => year_month(year, in_u32(m)?),
                (Some(m), Some(d)) => full_date(year, in_u32(m)?, in_u32(d)?),
                (None, Some(_)) => Err(DateProblem::Format),
            }
        }
        _ => Err(DateProblem::WrongType),
    }
}

pub struct DateNormalizer;

impl Normalizer for DateNormalizer {
    fn kind(&self) -> FieldKind {
        FieldKind::Date
    }

    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> Normalized {
        match parse_date_value(raw) {
            Ok(date) => Normalized::accepted(date.canonical(), raw, ErrorCode::DateNormalized, ctx),
            Err(DateProblem::Format) => {
                Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidDateFormat, raw))
            }
            Err(DateProblem::OutOfRange) => {
                Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidDateValue, raw))
            }
            Err(DateProblem::HasTime(date_part)) => Normalized::rejected(
                ctx.diagnostic(ErrorCode::DateHasTimeComponent, raw)
                    .with_corrected(date_part),
            ),
            Err(DateProblem::WrongType) => {
                Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidType, raw))
            }
        }
    }
}
