//! Prometheus-style metrics for the table pipeline.
//!
//! Recording is always safe: with no recorder installed the `metrics`
//! macros are no-ops, so library users and tests pay nothing.

use once_cell::sync::OnceCell;
use std::fmt;
use tracing::info;

use crate::domain::Warning;

/// Every metric name the crate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    NormalizeRecords,
    NormalizeSentinelCells,
    NormalizeBatches,
    ValidateWarnings,
    ValidateRuns,
    QueryViews,
    QueryViewSize,
    ExportRows,
    ExportFiles,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRecords => "tabkit_normalize_records_total",
            MetricName::NormalizeSentinelCells => "tabkit_normalize_sentinel_cells_total",
            MetricName::NormalizeBatches => "tabkit_normalize_batches_total",
            MetricName::ValidateWarnings => "tabkit_validate_warnings_total",
            MetricName::ValidateRuns => "tabkit_validate_runs_total",
            MetricName::QueryViews => "tabkit_query_views_total",
            MetricName::QueryViewSize => "tabkit_query_view_size",
            MetricName::ExportRows => "tabkit_export_rows_total",
            MetricName::ExportFiles => "tabkit_export_files_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::NormalizeRecords,
            MetricName::NormalizeSentinelCells,
            MetricName::NormalizeBatches,
            MetricName::ValidateWarnings,
            MetricName::ValidateRuns,
            MetricName::QueryViews,
            MetricName::QueryViewSize,
            MetricName::ExportRows,
            MetricName::ExportFiles,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceCell<metrics_exporter_prometheus::PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Calling it twice is harmless.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    let _ = METRICS_HANDLE.set(handle);
    info!("Metrics recorder installed");
    Ok(())
}

/// Current metrics in Prometheus text format, if a recorder is installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod normalize {
    use super::MetricName;

    pub fn records_normalized(profile: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecords.as_str(), "profile" => profile.to_string())
            .increment(count as u64);
        ::metrics::counter!(MetricName::NormalizeBatches.as_str()).increment(1);
    }

    pub fn sentinel_cells(count: usize) {
        ::metrics::counter!(MetricName::NormalizeSentinelCells.as_str()).increment(count as u64);
    }
}

pub mod validate {
    use super::{MetricName, Warning};

    pub fn warnings_emitted(warnings: &[Warning]) {
        ::metrics::counter!(MetricName::ValidateRuns.as_str()).increment(1);
        for warning in warnings {
            ::metrics::counter!(MetricName::ValidateWarnings.as_str(), "check" => warning.check.as_str())
                .increment(1);
        }
    }
}

pub mod query {
    use super::MetricName;

    pub fn view_computed(rows: usize) {
        ::metrics::counter!(MetricName::QueryViews.as_str()).increment(1);
        ::metrics::histogram!(MetricName::QueryViewSize.as_str()).record(rows as f64);
    }
}

pub mod export {
    use super::MetricName;

    pub fn rows_exported(rows: usize) {
        ::metrics::counter!(MetricName::ExportRows.as_str()).increment(rows as u64);
    }

    pub fn file_written() {
        ::metrics::counter!(MetricName::ExportFiles.as_str()).increment(1);
    }
}
