pub mod coerce;
pub mod dates;
pub mod payload;
pub mod registry;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{CanonicalRecord, Cell};
use crate::error::Result;
use crate::observability::metrics;
use crate::schema::{FieldKind, FieldSpec, Schema};

pub use payload::extract_records;

/// Trait for turning a raw payload into canonical records
pub trait Normalizer {
    /// Normalize every record in the payload. Fails only when the payload
    /// holds no record array at all; malformed records become sentinel rows.
    fn normalize(&self, payload: &Value) -> Result<Vec<CanonicalRecord>>;

    /// The profile records are normalized against
    fn schema(&self) -> &Schema;
}

/// Schema-driven normalizer: each field is read from its candidate paths
/// and coerced according to its kind.
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    schema: Schema,
}

impl DefaultNormalizer {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Normalize one raw element. Never fails; non-object input yields a
    /// record of sentinels.
    pub fn normalize_record(&self, position: usize, raw: &Value) -> CanonicalRecord {
        let cells = self
            .schema
            .fields()
            .iter()
            .map(|spec| normalize_field(spec, raw))
            .collect();
        CanonicalRecord { position, cells }
    }
}

fn normalize_field(spec: &FieldSpec, raw: &Value) -> Cell {
    let value = payload::first_present(raw, &spec.sources);

    let cell = match (&spec.kind, value) {
        (FieldKind::Count, value) => Some(Cell::Number(coerce::count(value))),
        (_, None) => None,
        (FieldKind::Number, Some(v)) => coerce::parse_number(v).map(Cell::Number),
        (FieldKind::Text | FieldKind::Category, Some(v)) => coerce::coerce_text(v).map(Cell::Text),
        (FieldKind::Year, Some(v)) => dates::year_from_value(v).map(Cell::Year),
        (FieldKind::Person { name_key, role_key }, Some(v)) => {
            coerce::coerce_person(v, name_key, role_key).map(Cell::Person)
        }
        (FieldKind::Series, Some(v)) => coerce::coerce_series(v).map(Cell::Series),
        (FieldKind::Names, Some(v)) => coerce::split_names(v).map(Cell::Names),
        (FieldKind::Flag, Some(v)) => coerce::coerce_flag(v).map(Cell::Flag),
    };

    cell.unwrap_or(Cell::Missing)
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, payload: &Value) -> Result<Vec<CanonicalRecord>> {
        let raw = extract_records(payload, &self.schema.collection_keys)?;

        let records: Vec<CanonicalRecord> = raw
            .iter()
            .enumerate()
            .map(|(position, value)| self.normalize_record(position, value))
            .collect();

        let mut sentinel_cells = 0usize;
        for spec_ix in 0..self.schema.fields().len() {
            let missing = records
                .iter()
                .filter(|r| matches!(r.cells[spec_ix], Cell::Missing))
                .count();
            if missing > 0 {
                debug!(
                    "field '{}' missing in {}/{} records",
                    self.schema.fields()[spec_ix].key,
                    missing,
                    records.len()
                );
            }
            sentinel_cells += missing;
        }

        info!(
            "normalized profile={} records={} sentinel_cells={}",
            self.schema.name,
            records.len(),
            sentinel_cells
        );
        metrics::normalize::records_normalized(&self.schema.name, records.len());
        metrics::normalize::sentinel_cells(sentinel_cells);

        Ok(records)
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Person, Series};
    use crate::schema::FieldId;
    use serde_json::json;

    fn cell<'a>(schema: &Schema, record: &'a CanonicalRecord, key: &str) -> &'a Cell {
        record.cell(schema.field_id(key).unwrap())
    }

    #[test]
    fn test_normalize_full_episode() {
        let normalizer = DefaultNormalizer::new(Schema::episodes());
        let payload = json!({"episodes": [{
            "rank": "3",
            "title": "Blink",
            "series": 3,
            "era": "Modern",
            "broadcast_date": "2007-06-09",
            "director": "Hettie MacDonald",
            "writer": "Steven Moffat",
            "doctor": {"actor": "David Tennant", "incarnation": "Tenth Doctor"},
            "companion": {"actor": "Freema Agyeman", "character": "Martha Jones"},
            "cast": [{"name": "Carey Mulligan"}, {"name": "Finlay Robertson"}]
        }]});

        let records = normalizer.normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        let schema = normalizer.schema();
        let r = &records[0];

        assert_eq!(r.rank(), &Cell::Number(3));
        assert_eq!(r.title(), &Cell::Text("Blink".into()));
        assert_eq!(cell(schema, r, "broadcast_year"), &Cell::Year(2007));
        assert_eq!(
            cell(schema, r, "doctor"),
            &Cell::Person(Person { name: "David Tennant".into(), role: Some("Tenth Doctor".into()) })
        );
        assert_eq!(cell(schema, r, "cast_count"), &Cell::Number(2));
    }

    #[test]
    fn test_malformed_records_are_kept_as_sentinels() {
        let normalizer = DefaultNormalizer::new(Schema::episodes());
        let payload = json!([42, null, {"title": "   ", "rank": "n/a", "cast": null}]);

        let records = normalizer.normalize(&payload).unwrap();
        assert_eq!(records.len(), 3);

        let schema = normalizer.schema();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.position, i);
            assert_eq!(record.cells.len(), schema.fields().len());
            assert_eq!(record.rank(), &Cell::Missing);
            assert_eq!(record.title(), &Cell::Missing);
            assert_eq!(cell(schema, record, "cast_count"), &Cell::Number(0));
            for id in schema.ids() {
                let shown = record.cell(id).render(&schema.field(id).kind);
                assert!(!shown.is_empty());
            }
        }
    }

    #[test]
    fn test_books_nested_award_and_series_union() {
        let normalizer = DefaultNormalizer::new(Schema::books());
        let payload = json!({"books": [
            {"id": 1, "title": "Dune", "author": "Frank Herbert",
             "award": {"year": 1966, "category": "Novel", "is_winner": true},
             "series": {"name": "Dune", "order": 1}, "genres": ["SF", "Epic"]},
            {"id": 2, "title": "The Left Hand of Darkness", "author": "Ursula K. Le Guin",
             "award": {"year": "1970", "category": "Novel", "is_winner": "yes"},
             "series": false},
            {"id": 3, "title": "Hyperion", "series": "Hyperion Cantos"}
        ]});

        let records = normalizer.normalize(&payload).unwrap();
        let schema = normalizer.schema();

        assert_eq!(cell(schema, &records[0], "award_year"), &Cell::Year(1966));
        assert_eq!(cell(schema, &records[0], "winner"), &Cell::Flag(true));
        assert_eq!(
            cell(schema, &records[0], "series"),
            &Cell::Series(Series::Ordered { name: "Dune".into(), order: 1 })
        );
        assert_eq!(cell(schema, &records[0], "genre_count"), &Cell::Number(2));

        assert_eq!(cell(schema, &records[1], "award_year"), &Cell::Year(1970));
        assert_eq!(cell(schema, &records[1], "series"), &Cell::Series(Series::None));

        assert_eq!(
            cell(schema, &records[2], "series"),
            &Cell::Series(Series::Named { name: "Hyperion Cantos".into() })
        );
        assert_eq!(cell(schema, &records[2], "award_year"), &Cell::Missing);
        assert_eq!(records[2].cell(FieldId::RANK), &Cell::Number(3));
    }

    #[test]
    fn test_unrecognized_payload_fails_load() {
        let normalizer = DefaultNormalizer::new(Schema::books());
        let err = normalizer.normalize(&json!({"count": 3})).unwrap_err();
        assert!(matches!(err, crate::error::TabkitError::Shape(_)));
    }
}
