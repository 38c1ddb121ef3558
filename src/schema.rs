//! Dataset profiles: which fields a canonical record carries, where each one
//! is read from in the raw payload, and how it is coerced.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOOKS_PROFILE, DASH_SENTINEL, DEFAULT_COLLECTION_KEYS, EPISODES_PROFILE, RANK_FIELD,
    TITLE_FIELD, UNKNOWN_SENTINEL,
};
use crate::error::{Result, TabkitError};

/// Coercion and comparison rules for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Permissively parsed integer.
    Number,
    /// Free text, compared case-insensitively.
    Text,
    /// Text used for exact-match dropdown filters.
    Category,
    /// Year derived from a free-form date.
    Year,
    /// Nested person object, read through the two sub-keys.
    Person { name_key: String, role_key: String },
    /// `false` | name | `{name, order}`.
    Series,
    /// Separator-delimited list of names.
    Names,
    /// Length of an optional array; 0 when absent.
    Count,
    Flag,
}

impl FieldKind {
    /// Placeholder rendered for a missing value of this kind.
    pub fn sentinel(&self) -> &'static str {
        match self {
            FieldKind::Number | FieldKind::Year | FieldKind::Series | FieldKind::Flag => {
                DASH_SENTINEL
            }
            FieldKind::Count => "0",
            FieldKind::Text | FieldKind::Category | FieldKind::Person { .. } | FieldKind::Names => {
                UNKNOWN_SENTINEL
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Year | FieldKind::Count)
    }
}

/// One column of a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical key, used on the command line and in configs.
    pub key: String,
    /// Display name; the CSV header.
    pub label: String,
    pub kind: FieldKind,
    /// Dotted JSON paths tried in order; the first present one wins.
    pub sources: Vec<String>,
    /// Whether free-text search looks at this field.
    #[serde(default)]
    pub searchable: bool,
}

impl FieldSpec {
    pub fn new(key: &str, label: &str, kind: FieldKind, sources: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            searchable: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }
}

/// Index of a field within a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(usize);

impl FieldId {
    pub const RANK: FieldId = FieldId(0);
    pub const TITLE: FieldId = FieldId(1);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A dataset profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    /// Object keys that may wrap the record array.
    pub collection_keys: Vec<String>,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema. Rank and title are always the first two fields; the
    /// title is always searchable and always searched first.
    pub fn new(
        name: &str,
        rank_sources: &[&str],
        title_sources: &[&str],
        extra: Vec<FieldSpec>,
    ) -> Result<Self> {
        let mut fields = vec![
            FieldSpec::new(RANK_FIELD, "Rank", FieldKind::Number, rank_sources),
            FieldSpec::new(TITLE_FIELD, "Title", FieldKind::Text, title_sources).searchable(),
        ];

        for spec in extra {
            if fields.iter().any(|f| f.key == spec.key) {
                return Err(TabkitError::Config(format!(
                    "duplicate field '{}' in profile '{}'",
                    spec.key, name
                )));
            }
            if spec.sources.is_empty() {
                return Err(TabkitError::Config(format!(
                    "field '{}' in profile '{}' has no sources",
                    spec.key, name
                )));
            }
            fields.push(spec);
        }

        Ok(Self {
            name: name.to_string(),
            collection_keys: DEFAULT_COLLECTION_KEYS.iter().map(|s| s.to_string()).collect(),
            fields,
        })
    }

    pub fn with_collection_keys(mut self, keys: Vec<String>) -> Self {
        self.collection_keys = keys;
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &FieldSpec {
        &self.fields[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        (0..self.fields.len()).map(FieldId)
    }

    /// Resolve a field key (case-insensitive) or display label.
    pub fn field_id(&self, key: &str) -> Result<FieldId> {
        let wanted = key.trim();
        self.fields
            .iter()
            .position(|f| f.key.eq_ignore_ascii_case(wanted) || f.label.eq_ignore_ascii_case(wanted))
            .map(FieldId)
            .ok_or_else(|| TabkitError::UnknownField(format!("{} (profile '{}')", wanted, self.name)))
    }

    /// Fields consulted by free-text search, title first.
    pub fn searchable_fields(&self) -> Vec<FieldId> {
        self.ids().filter(|id| self.field(*id).searchable).collect()
    }

    pub fn fields_of_kind<'a>(&'a self, pred: impl Fn(&FieldKind) -> bool + 'a) -> impl Iterator<Item = FieldId> + 'a {
        self.ids().filter(move |id| pred(&self.field(*id).kind))
    }

    pub fn labels(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.label.clone()).collect()
    }

    /// Doctor Who episode listings.
    pub fn episodes() -> Self {
        let extra = vec![
            FieldSpec::new("series", "Series", FieldKind::Number, &["series", "season"]),
            FieldSpec::new("era", "Era", FieldKind::Category, &["era"]),
            FieldSpec::new("broadcast_year", "Year", FieldKind::Year, &["broadcast_date", "air_date", "year"]),
            FieldSpec::new("director", "Director", FieldKind::Text, &["director"]).searchable(),
            FieldSpec::new("writer", "Writer", FieldKind::Names, &["writer", "writers"]).searchable(),
            FieldSpec::new(
                "doctor",
                "Doctor",
                FieldKind::Person { name_key: "actor".into(), role_key: "incarnation".into() },
                &["doctor"],
            )
            .searchable(),
            FieldSpec::new(
                "companion",
                "Companion",
                FieldKind::Person { name_key: "actor".into(), role_key: "character".into() },
                &["companion"],
            )
            .searchable(),
            FieldSpec::new("cast_count", "Cast", FieldKind::Count, &["cast"]),
        ];
        // Static field list; construction cannot fail.
        Self::built_in(EPISODES_PROFILE, &["rank"], &["title", "name"], extra)
    }

    /// Hugo Award books.
    pub fn books() -> Self {
        let extra = vec![
            FieldSpec::new("author", "Author", FieldKind::Names, &["author", "authors"]).searchable(),
            FieldSpec::new("award_year", "Year", FieldKind::Year, &["award.year", "year", "publication_date"]),
            FieldSpec::new("category", "Category", FieldKind::Category, &["award.category", "category"]),
            FieldSpec::new("winner", "Winner", FieldKind::Flag, &["award.is_winner", "is_winner"]),
            FieldSpec::new("publisher", "Publisher", FieldKind::Text, &["publisher"]).searchable(),
            FieldSpec::new("series", "Series", FieldKind::Series, &["series"]).searchable(),
            FieldSpec::new("genres", "Genres", FieldKind::Names, &["genres"]),
            FieldSpec::new("genre_count", "Genre Count", FieldKind::Count, &["genres"]),
        ];
        Self::built_in(BOOKS_PROFILE, &["rank", "id"], &["title"], extra)
    }

    fn built_in(name: &str, rank: &[&str], title: &[&str], extra: Vec<FieldSpec>) -> Self {
        let mut fields = vec![
            FieldSpec::new(RANK_FIELD, "Rank", FieldKind::Number, rank),
            FieldSpec::new(TITLE_FIELD, "Title", FieldKind::Text, title).searchable(),
        ];
        fields.extend(extra);
        Self {
            name: name.to_string(),
            collection_keys: DEFAULT_COLLECTION_KEYS.iter().map(|s| s.to_string()).collect(),
            fields,
        }
    }

    /// Look up a built-in profile by name.
    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            EPISODES_PROFILE => Ok(Self::episodes()),
            BOOKS_PROFILE => Ok(Self::books()),
            other => Err(TabkitError::UnknownProfile(other.to_string())),
        }
    }
}
