use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::DEFAULT_DEBOUNCE_MS;
use crate::error::{Result, TabkitError};
use crate::pipeline::processing::normalize::registry::NormalizationRegistry;
use crate::pipeline::processing::validate::Validator;
use crate::schema::{FieldSpec, Schema};

pub const DEFAULT_CONFIG_PATH: &str = "tabkit.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
    pub profiles: Vec<ProfileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub debounce_ms: u64,
    /// Pin the validator's notion of "now"; wall clock when unset.
    pub current_year: Option<i32>,
    /// Replaces the wrapper keys of every profile.
    pub collection_keys: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            current_year: None,
            collection_keys: None,
        }
    }
}

impl PipelineConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validator(&self) -> Validator {
        match self.current_year {
            Some(year) => Validator::with_current_year(year),
            None => Validator::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub file_prefix: String,
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_prefix: "tabkit.log".to_string(),
            json_file: false,
        }
    }
}

/// A user-defined dataset profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    #[serde(default = "default_rank_sources")]
    pub rank: Vec<String>,
    #[serde(default = "default_title_sources")]
    pub title: Vec<String>,
    #[serde(default)]
    pub collection_keys: Option<Vec<String>>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

fn default_rank_sources() -> Vec<String> {
    vec!["rank".to_string()]
}

fn default_title_sources() -> Vec<String> {
    vec!["title".to_string(), "name".to_string()]
}

impl ProfileConfig {
    pub fn to_schema(&self) -> Result<Schema> {
        let rank: Vec<&str> = self.rank.iter().map(String::as_str).collect();
        let title: Vec<&str> = self.title.iter().map(String::as_str).collect();
        let schema = Schema::new(&self.name, &rank, &title, self.fields.clone())?;
        Ok(match &self.collection_keys {
            Some(keys) => schema.with_collection_keys(keys.clone()),
            None => schema,
        })
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if config.pipeline.debounce_ms == 0 {
            return Err(TabkitError::Config("pipeline.debounce_ms must be positive".to_string()));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TabkitError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Built-in profiles plus configured ones; configured profiles replace
    /// built-ins of the same name.
    pub fn build_registry(&self) -> Result<NormalizationRegistry> {
        let mut registry = NormalizationRegistry::new();
        if let Some(keys) = &self.pipeline.collection_keys {
            registry.set_collection_keys(keys);
        }
        for profile in &self.profiles {
            registry.register(profile.to_schema()?);
        }
        Ok(registry)
    }
}
