//! Year extraction from free-form date strings.
//!
//! Strategies are tried in order and the first that yields a year wins.
//! The bare four-digit year is matched by pattern before any generic
//! parsing so "1963" is never routed through a timestamp parser.

use chrono::{DateTime, Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

pub struct DateStrategy {
    pub name: &'static str,
    pattern: Regex,
    extract: fn(&Captures) -> Option<i32>,
}

impl DateStrategy {
    fn new(name: &'static str, pattern: &str, extract: fn(&Captures) -> Option<i32>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid date pattern"),
            extract,
        }
    }

    pub fn apply(&self, input: &str) -> Option<i32> {
        self.pattern.captures(input).and_then(|c| (self.extract)(&c))
    }
}

fn group_i32(c: &Captures, i: usize) -> Option<i32> {
    c.get(i)?.as_str().parse().ok()
}

fn plausible(year: i32) -> Option<i32> {
    (1..=9999).contains(&year).then_some(year)
}

fn month_day_ok(month: i32, day: i32) -> bool {
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

pub static DATE_CHAIN: Lazy<Vec<DateStrategy>> = Lazy::new(|| {
    vec![
        DateStrategy::new("iso", r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$", |c| {
            let (y, m, d) = (group_i32(c, 1)?, group_i32(c, 2)?, group_i32(c, 3)?);
            month_day_ok(m, d).then_some(y).and_then(plausible)
        }),
        // Day-first or month-first; only the year is kept either way
        DateStrategy::new("slash", r"^(\d{1,2})/(\d{1,2})/(\d{4})$", |c| {
            let (a, b, y) = (group_i32(c, 1)?, group_i32(c, 2)?, group_i32(c, 3)?);
            (month_day_ok(b, a) || month_day_ok(a, b)).then_some(y).and_then(plausible)
        }),
        DateStrategy::new(
            "long",
            r"(?i)^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$",
            |c| {
                let day = group_i32(c, 2)?;
                (1..=31).contains(&day).then(|| group_i32(c, 3)).flatten().and_then(plausible)
            },
        ),
        DateStrategy::new(
            "month_year",
            r"(?i)^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})$",
            |c| group_i32(c, 2).and_then(plausible),
        ),
        DateStrategy::new("iso_month", r"^(\d{4})-(\d{1,2})$", |c| {
            let (y, m) = (group_i32(c, 1)?, group_i32(c, 2)?);
            (1..=12).contains(&m).then_some(y).and_then(plausible)
        }),
        DateStrategy::new("year", r"^(\d{4})$", |c| group_i32(c, 1).and_then(plausible)),
    ]
});

const GENERIC_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y", "%Y/%m/%d", "%m/%d/%Y", "%B %d %Y", "%Y.%m.%d"];

/// Last-resort parsing for shapes the pattern chain does not cover.
fn generic_year(input: &str) -> Option<i32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return plausible(dt.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return plausible(dt.year());
    }
    GENERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|date| plausible(date.year()))
}

/// Derive a year from a date string, or `None` when nothing matches.
pub fn extract_year(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_CHAIN
        .iter()
        .find_map(|s| s.apply(trimmed))
        .or_else(|| generic_year(trimmed))
}

/// Year from a raw JSON value: integers are taken as years, strings go
/// through [`extract_year`].
pub fn year_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok())
            .and_then(plausible),
        Value::String(s) => extract_year(s),
        _ => None,
    }
}
