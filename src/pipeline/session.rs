//! The store object: owns one loaded dataset plus the current filter and
//! sort, and recomputes the view on demand. Several sessions can live side
//! by side (one per dataset or test fixture).

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{CanonicalRecord, Warning};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::export::csv;
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
use crate::pipeline::processing::validate::Validator;
use crate::pipeline::query::filter::{self, CategorySelector, FilterSpec};
use crate::pipeline::query::sort::{self, SortMode, SortSpec};
use crate::schema::Schema;

pub struct Session {
    normalizer: DefaultNormalizer,
    validator: Validator,
    records: Vec<CanonicalRecord>,
    warnings: Vec<Warning>,
    filter: FilterSpec,
    sort: SortSpec,
}

impl Session {
    /// Normalize and validate `payload`. Fails only on an unrecognized
    /// payload shape.
    pub fn load(normalizer: DefaultNormalizer, validator: Validator, payload: &Value) -> Result<Self> {
        let records = normalizer.normalize(payload)?;
        let warnings = validator.validate(normalizer.schema(), &records);
        Ok(Self {
            normalizer,
            validator,
            records,
            warnings,
            filter: FilterSpec::new(),
            sort: SortSpec::new(),
        })
    }

    /// Replace the dataset, keeping the current filter and sort. On error
    /// the previous dataset stays loaded.
    pub fn reload(&mut self, payload: &Value) -> Result<()> {
        let records = self.normalizer.normalize(payload)?;
        self.warnings = self.validator.validate(self.normalizer.schema(), &records);
        self.records = records;
        info!("session reloaded records={}", self.records.len());
        Ok(())
    }

    /// Clear filter and sort; the data stays loaded.
    pub fn reset(&mut self) {
        self.filter = FilterSpec::new();
        self.sort = SortSpec::new();
    }

    pub fn schema(&self) -> &Schema {
        self.normalizer.schema()
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn set_query(&mut self, query: &str) {
        self.filter.query = query.to_string();
    }

    /// Set a category selector by field key; `"All"` clears it.
    pub fn set_category(&mut self, field: &str, value: &str) -> Result<()> {
        let id = self.schema().field_id(field)?;
        self.filter.set_category(id, CategorySelector::parse(value));
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterSpec::new();
    }

    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
    }

    /// Header click on `field`.
    pub fn toggle_sort(&mut self, field: &str, mode: SortMode) -> Result<()> {
        let id = self.schema().field_id(field)?;
        self.sort.toggle(id, mode);
        Ok(())
    }

    /// Filtered, ordered references into the loaded records.
    pub fn view(&self) -> Vec<&CanonicalRecord> {
        let schema = self.schema();
        let mut view = filter::filter(&self.records, schema, &self.filter);
        sort::sort(&mut view, schema, &self.sort);
        debug!("view computed rows={}/{}", view.len(), self.records.len());
        metrics::query::view_computed(view.len());
        view
    }

    /// Dropdown options for a categorical field.
    pub fn options(&self, field: &str) -> Result<Vec<String>> {
        let id = self.schema().field_id(field)?;
        Ok(filter::distinct_values(&self.records, self.schema(), id))
    }

    /// Data-row count and CSV of the current view, from a single view pass.
    pub fn export(&self) -> (usize, String) {
        let view = self.view();
        metrics::export::rows_exported(view.len());
        (view.len(), csv::to_csv(self.schema(), &view))
    }

    /// CSV of the current view.
    pub fn export_csv(&self) -> String {
        self.export().1
    }
}
