//! Canonical data shapes shared by every stage of the pipeline.
//!
//! Raw JSON is inspected exactly once, in the normalizer. Everything
//! downstream works on [`CanonicalRecord`]s whose values are closed
//! [`Cell`] variants, so filters and comparators switch on a tag instead of
//! re-deriving types from loose input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{NAMES_SEPARATOR, NO_SERIES};
use crate::schema::FieldKind;

/// A person reference such as a lead actor and the part they played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: Option<String>,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Some(role) => write!(f, "{} ({})", self.name, role),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Series membership. Sources encode this as `false`, a bare name, or an
/// object carrying a name and a position within the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    None,
    Named { name: String },
    Ordered { name: String, order: i64 },
}

impl Series {
    pub fn name(&self) -> Option<&str> {
        match self {
            Series::None => None,
            Series::Named { name } | Series::Ordered { name, .. } => Some(name),
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::None => write!(f, "{}", NO_SERIES),
            Series::Named { name } => write!(f, "{}", name),
            Series::Ordered { name, order } => write!(f, "{} (#{})", name, order),
        }
    }
}

/// One normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Absent or unparseable input.
    Missing,
    Number(i64),
    Text(String),
    Year(i32),
    Person(Person),
    Series(Series),
    /// De-duplicated multi-value list, in first-seen order.
    Names(Vec<String>),
    Flag(bool),
}

impl Cell {
    /// True when the cell stands in for absent data. `Series::None` counts:
    /// it is the placeholder sources use for "not in a series".
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Cell::Missing | Cell::Series(Series::None))
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_year(&self) -> Option<i32> {
        match self {
            Cell::Year(y) => Some(*y),
            _ => None,
        }
    }

    /// Text shown to users and written to exports. Missing cells render as
    /// the placeholder for `kind`, so output never carries a blank value.
    pub fn render(&self, kind: &FieldKind) -> String {
        match self {
            Cell::Missing => kind.sentinel().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Year(y) => y.to_string(),
            Cell::Person(p) => p.to_string(),
            Cell::Series(s) => s.to_string(),
            Cell::Names(names) => names.join(NAMES_SEPARATOR),
            Cell::Flag(true) => "Yes".to_string(),
            Cell::Flag(false) => "No".to_string(),
        }
    }
}

/// A dataset row after normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Zero-based index of the raw element this record came from.
    pub position: usize,
    /// Values aligned with the schema's fields. Index 0 is the rank,
    /// index 1 the title.
    pub cells: Vec<Cell>,
}

impl CanonicalRecord {
    pub fn rank(&self) -> &Cell {
        &self.cells[0]
    }

    pub fn title(&self) -> &Cell {
        &self.cells[1]
    }

    pub fn cell(&self, field: crate::schema::FieldId) -> &Cell {
        self.cells.get(field.index()).unwrap_or(&Cell::Missing)
    }

    pub fn id(&self) -> RecordId {
        RecordId {
            position: self.position,
            rank: self.rank().as_number(),
        }
    }
}

/// Identifies the record a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordId {
    pub position: usize,
    pub rank: Option<i64>,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Some(rank) => write!(f, "#{}", rank),
            None => write!(f, "record[{}]", self.position),
        }
    }
}

/// Which integrity check raised a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCheck {
    MissingField,
    DuplicateRank,
    OutOfRange,
    FutureDate,
}

impl WarningCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCheck::MissingField => "missing_field",
            WarningCheck::DuplicateRank => "duplicate_rank",
            WarningCheck::OutOfRange => "out_of_range",
            WarningCheck::FutureDate => "future_date",
        }
    }
}

/// Observational integrity note produced by validation. Never alters records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub record: RecordId,
    pub check: WarningCheck,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_display() {
        let both = Person { name: "Tom Baker".into(), role: Some("Fourth Doctor".into()) };
        assert_eq!(both.to_string(), "Tom Baker (Fourth Doctor)");

        let name_only = Person { name: "Tom Baker".into(), role: None };
        assert_eq!(name_only.to_string(), "Tom Baker");
    }

    #[test]
    fn test_series_display() {
        assert_eq!(Series::None.to_string(), "None");
        assert_eq!(Series::Named { name: "Foundation".into() }.to_string(), "Foundation");
        assert_eq!(
            Series::Ordered { name: "Expanse".into(), order: 3 }.to_string(),
            "Expanse (#3)"
        );
    }

    #[test]
    fn test_missing_renders_kind_sentinel() {
        assert_eq!(Cell::Missing.render(&FieldKind::Number), "—");
        assert_eq!(Cell::Missing.render(&FieldKind::Text), "Unknown");
        assert_eq!(Cell::Names(vec!["A".into(), "B".into()]).render(&FieldKind::Names), "A, B");
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId { position: 4, rank: Some(12) }.to_string(), "#12");
        assert_eq!(RecordId { position: 4, rank: None }.to_string(), "record[4]");
    }
}
