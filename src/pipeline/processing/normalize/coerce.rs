//! Permissive per-kind coercions. Each returns `None` when the input cannot
//! produce a real value; the caller substitutes `Cell::Missing`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use crate::domain::{Person, Series};

static NAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:[&,;]|\s+and\s+)\s*").expect("valid separator pattern"));

/// Integers, integral floats (others truncate), and numeric strings such as
/// `" 12 "`, `"#7"` or `"1,024"`.
pub fn parse_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

fn parse_number_str(input: &str) -> Option<i64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('#')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok().or_else(|| {
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    })
}

/// Trimmed, non-blank text. Numbers and booleans are stringified.
pub fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Person from an object (`name_key`/`role_key`), a bare name, or the first
/// element of an array of either.
pub fn coerce_person(value: &Value, name_key: &str, role_key: &str) -> Option<Person> {
    match value {
        Value::Object(map) => {
            let name = map.get(name_key).and_then(coerce_text)?;
            let role = map.get(role_key).and_then(coerce_text);
            Some(Person { name, role })
        }
        Value::String(_) => coerce_text(value).map(|name| Person { name, role: None }),
        Value::Array(items) => items.first().and_then(|v| coerce_person(v, name_key, role_key)),
        _ => None,
    }
}

/// `false` means "not part of a series"; a string is the series name; an
/// object carries `name` and optionally `order`.
pub fn coerce_series(value: &Value) -> Option<Series> {
    match value {
        Value::Bool(false) => Some(Series::None),
        Value::String(_) => coerce_text(value).map(|name| Series::Named { name }),
        Value::Object(map) => {
            let name = map.get("name").and_then(coerce_text)?;
            match map.get("order").and_then(parse_number) {
                Some(order) => Some(Series::Ordered { name, order }),
                None => Some(Series::Named { name }),
            }
        }
        _ => None,
    }
}

/// Split separator-delimited names, trim, and drop case-insensitive repeats
/// keeping the first spelling seen.
pub fn split_names(value: &Value) -> Option<Vec<String>> {
    let mut raw: Vec<String> = Vec::new();
    match value {
        Value::String(s) => raw.extend(NAME_SEPARATORS.split(s).map(|p| p.to_string())),
        Value::Array(items) => {
            for item in items {
                if let Some(text) = coerce_text(item) {
                    raw.extend(NAME_SEPARATORS.split(&text).map(|p| p.to_string()));
                }
            }
        }
        _ => return None,
    }

    let mut seen = HashSet::new();
    let names: Vec<String> = raw
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .collect();

    (!names.is_empty()).then_some(names)
}

/// Array length, or an explicit count; anything else counts as zero.
pub fn count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Array(items)) => items.len() as i64,
        Some(other) => parse_number(other).unwrap_or(0),
        None => 0,
    }
}
