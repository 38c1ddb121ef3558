use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::ALL_SELECTOR;
use crate::domain::CanonicalRecord;
use crate::schema::{FieldId, Schema};

/// Dropdown-style selector for a categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategorySelector {
    All,
    Exact(String),
}

impl CategorySelector {
    /// `""` and `"All"` (any case) mean no filter.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SELECTOR) {
            CategorySelector::All
        } else {
            CategorySelector::Exact(trimmed.to_string())
        }
    }
}

/// Conjunction of predicates. Unset predicates match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub query: String,
    pub categories: BTreeMap<FieldId, CategorySelector>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_category(mut self, field: FieldId, selector: CategorySelector) -> Self {
        self.set_category(field, selector);
        self
    }

    pub fn set_category(&mut self, field: FieldId, selector: CategorySelector) {
        match selector {
            CategorySelector::All => {
                self.categories.remove(&field);
            }
            exact => {
                self.categories.insert(field, exact);
            }
        }
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.categories.is_empty()
    }
}

/// Free text: case-insensitive substring over the schema's searchable
/// fields, title first. Sentinel cells are never searched.
fn matches_query(schema: &Schema, record: &CanonicalRecord, needle: &str, fields: &[FieldId]) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|id| {
        let cell = record.cell(*id);
        !cell.is_sentinel() && cell.render(&schema.field(*id).kind).to_lowercase().contains(needle)
    })
}

fn matches_categories(schema: &Schema, record: &CanonicalRecord, spec: &FilterSpec) -> bool {
    spec.categories.iter().all(|(id, selector)| match selector {
        CategorySelector::All => true,
        CategorySelector::Exact(wanted) => {
            record.cell(*id).render(&schema.field(*id).kind) == *wanted
        }
    })
}

/// Select the records passing every active predicate, preserving input
/// order. Returns references into the input; nothing is copied or mutated.
pub fn filter<'a, I>(records: I, schema: &Schema, spec: &FilterSpec) -> Vec<&'a CanonicalRecord>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let needle = spec.query.trim().to_lowercase();
    let searchable = schema.searchable_fields();

    records
        .into_iter()
        .filter(|r| matches_query(schema, r, &needle, &searchable))
        .filter(|r| matches_categories(schema, r, spec))
        .collect()
}

/// Distinct display values of a field, sorted case-insensitively; the
/// option list for a category dropdown.
pub fn distinct_values<'a, I>(records: I, schema: &Schema, field: FieldId) -> Vec<String>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let kind = &schema.field(field).kind;
    let set: BTreeSet<String> = records
        .into_iter()
        .map(|r| r.cell(field).render(kind))
        .collect();
    let mut values: Vec<String> = set.into_iter().collect();
    values.sort_by_key(|v| v.to_lowercase());
    values
}
