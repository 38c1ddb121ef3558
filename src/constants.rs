/// Display placeholders and shared names used across the pipeline.

/// Placeholder for missing numeric-like values (numbers, years, series, flags).
pub const DASH_SENTINEL: &str = "—";

/// Placeholder for missing textual values (text, categories, people, name lists).
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Display text for a record explicitly marked as not belonging to a series.
pub const NO_SERIES: &str = "None";

/// Selector text meaning "no category filter".
pub const ALL_SELECTOR: &str = "All";

/// Canonical separator used when re-joining multi-value fields.
pub const NAMES_SEPARATOR: &str = ", ";

/// Keys that commonly wrap the record array in a payload object.
pub const DEFAULT_COLLECTION_KEYS: &[&str] =
    &["episodes", "books", "data", "items", "records", "results"];

/// Built-in profile names
pub const EPISODES_PROFILE: &str = "episodes";
pub const BOOKS_PROFILE: &str = "books";

/// Reserved field keys; every schema starts with these two
pub const RANK_FIELD: &str = "rank";
pub const TITLE_FIELD: &str = "title";

/// Default quiet window for free-text input
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Get all built-in profile names
pub fn get_builtin_profiles() -> Vec<&'static str> {
    vec![EPISODES_PROFILE, BOOKS_PROFILE]
}
