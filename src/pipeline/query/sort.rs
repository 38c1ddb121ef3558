use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::{CanonicalRecord, Cell, Series};
use crate::error::{Result, TabkitError};
use crate::schema::{FieldId, FieldKind, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

impl FromStr for Direction {
    type Err = TabkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(TabkitError::InvalidSort(format!("unknown direction '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: FieldId,
    pub direction: Direction,
}

/// What a header click on a new field does to the existing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// The new field becomes the only key.
    Replace,
    /// The new field is added as the lowest-priority key.
    Append,
}

/// Ordered (field, direction) keys; the first key is primary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(field: FieldId, direction: Direction) -> Self {
        Self {
            keys: vec![SortKey { field, direction }],
        }
    }

    pub fn then(mut self, field: FieldId, direction: Direction) -> Self {
        self.keys.retain(|k| k.field != field);
        self.keys.push(SortKey { field, direction });
        self
    }

    pub fn primary(&self) -> Option<&SortKey> {
        self.keys.first()
    }

    /// Header-click semantics: the active primary field flips direction; a
    /// new field starts ascending and replaces or extends the keys. In
    /// append mode a field already present as a secondary key is flipped.
    pub fn toggle(&mut self, field: FieldId, mode: SortMode) {
        if let Some(primary) = self.keys.first_mut() {
            if primary.field == field {
                primary.direction = primary.direction.reversed();
                return;
            }
        }

        match mode {
            SortMode::Replace => {
                self.keys = vec![SortKey { field, direction: Direction::Ascending }];
            }
            SortMode::Append => match self.keys.iter_mut().find(|k| k.field == field) {
                Some(existing) => existing.direction = existing.direction.reversed(),
                None => self.keys.push(SortKey { field, direction: Direction::Ascending }),
            },
        }
    }

    /// Parse `field[:asc|:desc]` terms, e.g. `["era", "rank:desc"]`.
    pub fn parse(schema: &Schema, terms: &[String]) -> Result<Self> {
        let mut spec = SortSpec::new();
        for term in terms {
            let (name, dir) = match term.split_once(':') {
                Some((name, dir)) => (name, dir.parse::<Direction>()?),
                None => (term.as_str(), Direction::Ascending),
            };
            let field = schema
                .field_id(name)
                .map_err(|_| TabkitError::InvalidSort(term.clone()))?;
            spec = spec.then(field, dir);
        }
        Ok(spec)
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn cmp_series(a: &Series, b: &Series) -> Ordering {
    match (a, b) {
        (Series::Ordered { name: an, order: ao }, Series::Ordered { name: bn, order: bo }) => {
            cmp_text(an, bn).then(ao.cmp(bo))
        }
        _ => {
            let (an, bn) = (a.name().unwrap_or(""), b.name().unwrap_or(""));
            // Unordered entries sit ahead of numbered ones with the same name
            let rank = |s: &Series| matches!(s, Series::Ordered { .. }) as u8;
            cmp_text(an, bn).then(rank(a).cmp(&rank(b)))
        }
    }
}

/// Compare two real (non-sentinel) values of a field.
pub fn compare_values(kind: &FieldKind, a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Number(x), Cell::Number(y)) => x.cmp(y),
        (Cell::Year(x), Cell::Year(y)) => x.cmp(y),
        (Cell::Flag(x), Cell::Flag(y)) => x.cmp(y),
        (Cell::Series(x), Cell::Series(y)) => cmp_series(x, y),
        (Cell::Text(x), Cell::Text(y)) => cmp_text(x, y),
        // People, name lists, and anything mismatched compare by what is shown
        _ => cmp_text(&a.render(kind), &b.render(kind)),
    }
}

/// Ordering of one key with sentinels pinned last in either direction.
pub fn compare_cells(kind: &FieldKind, a: &Cell, b: &Cell, direction: Direction) -> Ordering {
    match (a.is_sentinel(), b.is_sentinel()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(kind, a, b);
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        }
    }
}

/// Full comparator: each key in turn, then load position. Total, so
/// re-sorting is deterministic.
pub fn compare_records(schema: &Schema, spec: &SortSpec, a: &CanonicalRecord, b: &CanonicalRecord) -> Ordering {
    spec.keys
        .iter()
        .map(|key| {
            let kind = &schema.field(key.field).kind;
            compare_cells(kind, a.cell(key.field), b.cell(key.field), key.direction)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.position.cmp(&b.position))
}

/// Reorder a view in place. Only the order of references changes.
pub fn sort(view: &mut [&CanonicalRecord], schema: &Schema, spec: &SortSpec) {
    view.sort_by(|a, b| compare_records(schema, spec, a, b));
}

/// Sorted copy of a view.
pub fn sorted<'a>(view: &[&'a CanonicalRecord], schema: &Schema, spec: &SortSpec) -> Vec<&'a CanonicalRecord> {
    let mut out = view.to_vec();
    sort(&mut out, schema, spec);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    fn load(schema: Schema, payload: serde_json::Value) -> (Schema, Vec<CanonicalRecord>) {
        let normalizer = DefaultNormalizer::new(schema);
        let records = normalizer.normalize(&payload).unwrap();
        (normalizer.schema().clone(), records)
    }

    fn positions(view: &[&CanonicalRecord]) -> Vec<usize> {
        view.iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([{"rank": "10", "title": "x"}, {"rank": "2", "title": "y"}, {"rank": 1, "title": "z"}]),
        );
        let mut view: Vec<&CanonicalRecord> = records.iter().collect();
        sort(&mut view, &schema, &SortSpec::by(FieldId::RANK, Direction::Ascending));
        assert_eq!(positions(&view), vec![2, 1, 0]);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([{"title": "blink"}, {"title": "Army of Ghosts"}, {"title": "Castrovalva"}]),
        );
        let view: Vec<&CanonicalRecord> = records.iter().collect();
        let view = sorted(&view, &schema, &SortSpec::by(FieldId::TITLE, Direction::Ascending));
        assert_eq!(positions(&view), vec![1, 0, 2]);
    }

    #[test]
    fn test_ties_fall_back_to_load_order() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([{"rank": 2, "title": "B"}, {"rank": 1, "title": "A"}, {"rank": 2, "title": "C"}]),
        );
        let view: Vec<&CanonicalRecord> = records.iter().collect();

        let asc = sorted(&view, &schema, &SortSpec::by(FieldId::RANK, Direction::Ascending));
        assert_eq!(positions(&asc), vec![1, 0, 2]);

        let desc = sorted(&view, &schema, &SortSpec::by(FieldId::RANK, Direction::Descending));
        assert_eq!(positions(&desc), vec![0, 2, 1]);
    }

    #[test]
    fn test_sentinels_last_in_both_directions() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([
                {"rank": 1, "broadcast_date": "1963-11-23"},
                {"rank": 2},
                {"rank": 3, "broadcast_date": "2005-03-26"},
                {"rank": 4, "broadcast_date": "not a date"}
            ]),
        );
        let year = schema.field_id("broadcast_year").unwrap();
        let view: Vec<&CanonicalRecord> = records.iter().collect();

        let asc = sorted(&view, &schema, &SortSpec::by(year, Direction::Ascending));
        assert_eq!(positions(&asc), vec![0, 2, 1, 3]);

        let desc = sorted(&view, &schema, &SortSpec::by(year, Direction::Descending));
        assert_eq!(positions(&desc), vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_series_none_sorts_with_sentinels() {
        let (schema, records) = load(
            Schema::books(),
            json!([
                {"id": 1, "series": false},
                {"id": 2, "series": {"name": "Dune", "order": 2}},
                {"id": 3, "series": "Culture"},
                {"id": 4, "series": {"name": "dune", "order": 1}}
            ]),
        );
        let series = schema.field_id("series").unwrap();
        let view: Vec<&CanonicalRecord> = records.iter().collect();
        let asc = sorted(&view, &schema, &SortSpec::by(series, Direction::Ascending));
        assert_eq!(positions(&asc), vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_multi_key() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([
                {"rank": 1, "era": "Modern"},
                {"rank": 2, "era": "Classic"},
                {"rank": 3, "era": "Modern"},
                {"rank": 4, "era": "Classic"}
            ]),
        );
        let era = schema.field_id("era").unwrap();
        let spec = SortSpec::by(era, Direction::Ascending).then(FieldId::RANK, Direction::Descending);
        let view: Vec<&CanonicalRecord> = records.iter().collect();
        assert_eq!(positions(&sorted(&view, &schema, &spec)), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_toggle_law_and_idempotence() {
        let (schema, records) = load(
            Schema::episodes(),
            json!([{"rank": 3}, {"rank": 1}, {}, {"rank": 2}]),
        );
        let view: Vec<&CanonicalRecord> = records.iter().collect();

        let mut spec = SortSpec::new();
        spec.toggle(FieldId::RANK, SortMode::Replace);
        let asc = sorted(&view, &schema, &spec);
        assert_eq!(positions(&asc), vec![1, 3, 0, 2]);
        assert_eq!(positions(&sorted(&asc, &schema, &spec)), positions(&asc));

        spec.toggle(FieldId::RANK, SortMode::Replace);
        assert_eq!(spec.primary().unwrap().direction, Direction::Descending);
        let desc = sorted(&asc, &schema, &spec);
        assert_eq!(positions(&desc), vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_toggle_new_field_modes() {
        let schema = Schema::episodes();
        let era = schema.field_id("era").unwrap();

        let mut spec = SortSpec::by(FieldId::RANK, Direction::Descending);
        spec.toggle(era, SortMode::Replace);
        assert_eq!(spec, SortSpec::by(era, Direction::Ascending));

        let mut spec = SortSpec::by(FieldId::RANK, Direction::Descending);
        spec.toggle(era, SortMode::Append);
        assert_eq!(spec.keys.len(), 2);
        assert_eq!(spec.keys[1], SortKey { field: era, direction: Direction::Ascending });
        spec.toggle(era, SortMode::Append);
        assert_eq!(spec.keys[1].direction, Direction::Descending);
    }

    #[test]
    fn test_parse_terms() {
        let schema = Schema::episodes();
        let spec = SortSpec::parse(&schema, &["era".into(), "rank:desc".into()]).unwrap();
        assert_eq!(spec.keys.len(), 2);
        assert_eq!(spec.keys[1].direction, Direction::Descending);
        assert!(SortSpec::parse(&schema, &["rank:sideways".into()]).is_err());
        assert!(SortSpec::parse(&schema, &["nope".into()]).is_err());
    }
}
