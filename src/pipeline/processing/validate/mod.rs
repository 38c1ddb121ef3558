use chrono::{Datelike, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::{CanonicalRecord, Cell, Warning, WarningCheck};
use crate::observability::metrics;
use crate::schema::{FieldId, FieldKind, Schema};

/// Configuration for validation rules
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Years after this one are flagged as future dates
    pub current_year: i32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            current_year: Utc::now().year(),
        }
    }
}

/// Lenient integrity checks over a normalized dataset. Every check runs;
/// none short-circuits another, and records are never altered or dropped.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    pub config: ValidatorConfig,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate against a fixed "now" instead of the wall clock
    pub fn with_current_year(current_year: i32) -> Self {
        Self {
            config: ValidatorConfig { current_year },
        }
    }

    /// Run every check. Warnings come back ordered by record position, then
    /// by check (missing field, duplicate rank, range, future date).
    pub fn validate(&self, schema: &Schema, records: &[CanonicalRecord]) -> Vec<Warning> {
        let mut warnings = Vec::new();
        warnings.extend(check_required(records));
        warnings.extend(check_unique_rank(records));
        warnings.extend(check_ranges(schema, records));
        warnings.extend(check_future_years(schema, records, self.config.current_year));

        warnings.sort_by_key(|w| (w.record.position, w.check));

        for warning in &warnings {
            debug!("validation warning {}", warning);
        }
        info!(
            "validated profile={} records={} warnings={}",
            schema.name,
            records.len(),
            warnings.len()
        );
        metrics::validate::warnings_emitted(&warnings);

        warnings
    }
}

fn warn(record: &CanonicalRecord, check: WarningCheck, message: String) -> Warning {
    Warning {
        record: record.id(),
        check,
        message,
    }
}

fn check_required(records: &[CanonicalRecord]) -> Vec<Warning> {
    let mut out = Vec::new();
    for record in records {
        if matches!(record.title(), Cell::Missing) {
            out.push(warn(record, WarningCheck::MissingField, "missing title".into()));
        }
        if matches!(record.rank(), Cell::Missing) {
            out.push(warn(record, WarningCheck::MissingField, "missing rank".into()));
        }
    }
    out
}

/// First occurrence of a rank is fine; every later one is flagged.
fn check_unique_rank(records: &[CanonicalRecord]) -> Vec<Warning> {
    let mut first_seen: HashMap<i64, usize> = HashMap::new();
    let mut out = Vec::new();
    for record in records {
        let Some(rank) = record.rank().as_number() else {
            continue;
        };
        match first_seen.get(&rank) {
            Some(first) => out.push(warn(
                record,
                WarningCheck::DuplicateRank,
                format!("duplicate rank {} (first seen at record[{}])", rank, first),
            )),
            None => {
                first_seen.insert(rank, record.position);
            }
        }
    }
    out
}

fn check_ranges(schema: &Schema, records: &[CanonicalRecord]) -> Vec<Warning> {
    let count_fields: Vec<FieldId> = schema
        .fields_of_kind(|k| *k == FieldKind::Count)
        .collect();

    let mut out = Vec::new();
    for record in records {
        if let Some(rank) = record.rank().as_number() {
            if rank <= 0 {
                out.push(warn(
                    record,
                    WarningCheck::OutOfRange,
                    format!("rank must be positive, got {}", rank),
                ));
            }
        }
        for field in &count_fields {
            if let Some(n) = record.cell(*field).as_number() {
                if n < 0 {
                    out.push(warn(
                        record,
                        WarningCheck::OutOfRange,
                        format!("{} is negative ({})", schema.field(*field).label, n),
                    ));
                }
            }
        }
    }
    out
}

fn check_future_years(schema: &Schema, records: &[CanonicalRecord], current_year: i32) -> Vec<Warning> {
    let year_fields: Vec<FieldId> = schema
        .fields_of_kind(|k| *k == FieldKind::Year)
        .collect();

    let mut out = Vec::new();
    for record in records {
        for field in &year_fields {
            if let Some(year) = record.cell(*field).as_year() {
                if year > current_year {
                    out.push(warn(
                        record,
                        WarningCheck::FutureDate,
                        format!(
                            "{} {} is in the future (current year {})",
                            schema.field(*field).label,
                            year,
                            current_year
                        ),
                    ));
                }
            }
        }
    }
    out
}
