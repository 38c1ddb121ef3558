use std::collections::BTreeMap;

use super::DefaultNormalizer;
use crate::constants::get_builtin_profiles;
use crate::error::{Result, TabkitError};
use crate::schema::Schema;

/// Registry of dataset profiles, keyed by profile name
pub struct NormalizationRegistry {
    profiles: BTreeMap<String, Schema>,
}

impl NormalizationRegistry {
    /// Create a registry holding the built-in profiles
    pub fn new() -> Self {
        let mut profiles = BTreeMap::new();
        for schema in get_builtin_profiles().into_iter().filter_map(|n| Schema::builtin(n).ok()) {
            profiles.insert(schema.name.clone(), schema);
        }
        Self { profiles }
    }

    /// Register (or replace) a profile
    pub fn register(&mut self, schema: Schema) {
        self.profiles.insert(schema.name.clone(), schema);
    }

    pub fn get_schema(&self, name: &str) -> Result<&Schema> {
        self.profiles
            .get(name)
            .ok_or_else(|| TabkitError::UnknownProfile(name.to_string()))
    }

    /// Build a normalizer for the named profile
    pub fn get_normalizer(&self, name: &str) -> Result<DefaultNormalizer> {
        self.get_schema(name).map(|s| DefaultNormalizer::new(s.clone()))
    }

    /// List all registered profile names
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(|k| k.as_str()).collect()
    }

    /// Apply `collection_keys` to every registered profile
    pub fn set_collection_keys(&mut self, keys: &[String]) {
        for schema in self.profiles.values_mut() {
            schema.collection_keys = keys.to_vec();
        }
    }
}

impl Default for NormalizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
