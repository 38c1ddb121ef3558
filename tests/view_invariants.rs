use serde_json::{json, Value};

use tabkit::domain::CanonicalRecord;
use tabkit::pipeline::export::csv::{parse_rows, record_row, to_csv};
use tabkit::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
use tabkit::pipeline::processing::validate::Validator;
use tabkit::pipeline::query::{filter, sort, CategorySelector, Direction, FilterSpec, SortSpec};
use tabkit::schema::Schema;

fn payload() -> Value {
    json!({"books": [
        {"rank": 5, "title": "Hyperion", "author": "Dan Simmons", "category": "Best Novel", "year": 1990},
        {"rank": 2, "title": "The Dispossessed", "author": "Ursula K. Le Guin", "category": "Best Novel"},
        {"rank": 2, "title": "Blindsight", "author": "Peter Watts", "category": "Finalist", "year": "2007"},
        {"title": "Untitled draft"},
        42,
        {"rank": "1,000", "title": "hyperion cantos", "author": ["Dan Simmons"], "series": {"name": "Hyperion", "order": 1}},
        {"rank": 3.9, "title": "Ancillary Justice", "author": "Ann Leckie; Ann Leckie", "category": "Best Novel", "year": 2014}
    ]})
}

fn records() -> (Schema, Vec<CanonicalRecord>) {
    let normalizer = DefaultNormalizer::new(Schema::books());
    let records = normalizer.normalize(&payload()).unwrap();
    (normalizer.schema().clone(), records)
}

fn specs(schema: &Schema) -> Vec<(FilterSpec, SortSpec)> {
    let category = schema.field_id("category").unwrap();
    let rank = schema.field_id("rank").unwrap();
    let title = schema.field_id("title").unwrap();
    let year = schema.field_id("award_year").unwrap();
    vec![
        (FilterSpec::new(), SortSpec::new()),
        (FilterSpec::new().with_query("hyperion"), SortSpec::by(rank, Direction::Descending)),
        (
            FilterSpec::new().with_category(category, CategorySelector::parse("Best Novel")),
            SortSpec::by(year, Direction::Ascending).then(title, Direction::Descending),
        ),
        (FilterSpec::new().with_query("zzz"), SortSpec::by(title, Direction::Ascending)),
    ]
}

#[test]
fn test_normalization_is_total_and_deterministic() {
    let normalizer = DefaultNormalizer::new(Schema::books());
    let first = normalizer.normalize(&payload()).unwrap();
    let second = normalizer.normalize(&payload()).unwrap();

    assert_eq!(first.len(), 7);
    assert_eq!(first, second);
    for (i, record) in first.iter().enumerate() {
        assert_eq!(record.position, i);
        assert_eq!(record_row(normalizer.schema(), record).len(), normalizer.schema().fields().len());
        assert!(record_row(normalizer.schema(), record).iter().all(|c| !c.is_empty()));
    }
    assert_eq!(first[5].rank().as_number(), Some(1000));
    assert_eq!(first[6].rank().as_number(), Some(3));
}

#[test]
fn test_validation_leaves_records_untouched() {
    let (schema, records) = records();
    let before = records.clone();
    let warnings = Validator::with_current_year(2024).validate(&schema, &records);

    assert_eq!(records, before);
    assert!(!warnings.is_empty());
    let positions: Vec<usize> = warnings.iter().map(|w| w.record.position).collect();
    let mut ordered = positions.clone();
    ordered.sort();
    assert_eq!(positions, ordered);
}

#[test]
fn test_filter_yields_ordered_subset() {
    let (schema, records) = records();
    for (spec, _) in specs(&schema) {
        let view = filter(&records, &schema, &spec);
        let positions: Vec<usize> = view.iter().map(|r| r.position).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for r in &view {
            assert!(std::ptr::eq(*r, &records[r.position]));
        }
    }
}

#[test]
fn test_sort_is_a_stable_permutation() {
    let (schema, records) = records();
    for (filter_spec, sort_spec) in specs(&schema) {
        let filtered = filter(&records, &schema, &filter_spec);
        let mut view = filtered.clone();
        sort(&mut view, &schema, &sort_spec);

        let mut a: Vec<usize> = filtered.iter().map(|r| r.position).collect();
        let mut b: Vec<usize> = view.iter().map(|r| r.position).collect();
        let sorted_once = b.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);

        let mut again = view.clone();
        sort(&mut again, &schema, &sort_spec);
        let resorted: Vec<usize> = again.iter().map(|r| r.position).collect();
        assert_eq!(resorted, sorted_once);
    }
}

#[test]
fn test_export_matches_view() {
    let (schema, records) = records();
    for (filter_spec, sort_spec) in specs(&schema) {
        let mut view = filter(&records, &schema, &filter_spec);
        sort(&mut view, &schema, &sort_spec);

        let text = to_csv(&schema, &view);
        assert_eq!(text, to_csv(&schema, &view));

        let rows = parse_rows(&text);
        assert_eq!(rows.len(), view.len() + 1);
        assert_eq!(rows[0], schema.labels());
        for (row, record) in rows[1..].iter().zip(&view) {
            assert_eq!(row, &record_row(&schema, record));
        }
    }
}
