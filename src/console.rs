//! Terminal presentation: fixed-width table rendering and the line commands
//! understood by the interactive browser.

use crate::app::export_use_case::ExportViewUseCase;
use crate::domain::{CanonicalRecord, Warning};
use crate::error::{Result, TabkitError};
use crate::infra::FileExportSink;
use crate::pipeline::export::csv::record_row;
use crate::pipeline::query::sort::{SortMode, SortSpec};
use crate::pipeline::session::Session;
use crate::schema::Schema;

const MAX_COLUMN_WIDTH: usize = 32;

fn truncate(cell: &str, width: usize) -> String {
    let flat = cell.replace('\n', " ");
    if flat.chars().count() <= width {
        return flat;
    }
    let mut out: String = flat.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Render up to `limit` rows of the view as an aligned text table.
pub fn render_table(schema: &Schema, view: &[&CanonicalRecord], limit: Option<usize>) -> String {
    let header = schema.labels();
    let shown = limit.unwrap_or(view.len()).min(view.len());
    let rows: Vec<Vec<String>> = view[..shown]
        .iter()
        .map(|r| {
            record_row(schema, r)
                .iter()
                .map(|c| truncate(c, MAX_COLUMN_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        padded.join(" │ ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&rule.join("─┼─"));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    if shown < view.len() {
        out.push_str(&format!("… {} more rows\n", view.len() - shown));
    }
    out
}

pub fn render_warnings(warnings: &[Warning]) -> String {
    warnings.iter().map(|w| format!("   - {}\n", w)).collect()
}

/// Split a `field=value` filter argument.
pub fn parse_filter_arg(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(f, v)| (f.trim(), v.trim()))
        .filter(|(f, _)| !f.is_empty())
        .ok_or_else(|| TabkitError::Config(format!("expected FIELD=VALUE, got '{}'", arg)))
}

/// Apply command-line style query, category filters and sort terms.
pub fn apply_view_args(
    session: &mut Session,
    query: Option<&str>,
    filters: &[String],
    sorts: &[String],
) -> Result<()> {
    if let Some(q) = query {
        session.set_query(q);
    }
    for arg in filters {
        let (field, value) = parse_filter_arg(arg)?;
        session.set_category(field, value)?;
    }
    if !sorts.is_empty() {
        let spec = SortSpec::parse(session.schema(), sorts)?;
        session.set_sort(spec);
    }
    Ok(())
}

/// One line typed into the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Plain text; debounced before it becomes the search query.
    Query(String),
    Sort { field: String, mode: SortMode },
    Filter { field: String, value: String },
    Warnings,
    Reset,
    Export(String),
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(BrowseCommand::Query(trimmed.to_string()));
        };
        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (rest, ""),
        };
        let need_arg = |what: &str| -> Result<String> {
            if arg.is_empty() {
                Err(TabkitError::Config(format!("/{} needs {}", cmd, what)))
            } else {
                Ok(arg.to_string())
            }
        };
        match cmd {
            "sort" => Ok(BrowseCommand::Sort { field: need_arg("a field")?, mode: SortMode::Replace }),
            "then" => Ok(BrowseCommand::Sort { field: need_arg("a field")?, mode: SortMode::Append }),
            "filter" => {
                let (field, value) = parse_filter_arg(arg)?;
                Ok(BrowseCommand::Filter { field: field.to_string(), value: value.to_string() })
            }
            "warnings" => Ok(BrowseCommand::Warnings),
            "reset" => Ok(BrowseCommand::Reset),
            "export" => Ok(BrowseCommand::Export(need_arg("a path")?)),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            other => Err(TabkitError::Config(format!("unknown command /{}", other))),
        }
    }
}

/// Write the view for a browse `/export`. A failed write becomes a warning
/// line and the browser keeps running.
pub async fn browse_export(session: &Session, path: &str) -> String {
    match ExportViewUseCase::new(Box::new(FileExportSink::new(path)))
        .execute(session)
        .await
    {
        Ok(rows) => format!("✅ Wrote {} rows to {}", rows, path),
        Err(e) => format!("⚠️  {:#}", e),
    }
}

pub const BROWSE_HELP: &str = "\
Type to search. Commands:
  /sort FIELD          sort by FIELD (again to flip direction)
  /then FIELD          add FIELD as a secondary sort key
  /filter FIELD=VALUE  category filter (VALUE 'All' clears it)
  /warnings            list validation warnings
  /reset               clear search, filters and sort
  /export PATH         write the current view as CSV
  /quit";
