//! Namespace qualification of the merged map.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use crate::RawConfigMap;

/// Fully merged configuration handed to the agent.
///
/// Every key starts with the namespace prefix followed by `.`. Entries are
/// ordered so two resolutions of the same inputs compare and print
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalConfig {
    prefix: String,
    entries: BTreeMap<String, String>,
}

impl FinalConfig {
    /// Namespace prefix shared by every key.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Looks up a fully-qualified key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Looks up a key relative to the prefix.
    #[must_use]
    pub fn get_unqualified(&self, key: &str) -> Option<&str> {
        self.get(&format!("{}.{key}", self.prefix))
    }

    /// Returns `true` when the fully-qualified key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Consumes the configuration, returning the raw entries.
    #[must_use]
    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a FinalConfig {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Prepends `prefix` and a `.` separator to every key.
///
/// The input map is left untouched. Distinct input keys always yield
/// distinct output keys.
#[must_use]
pub fn qualify(raw: &RawConfigMap, prefix: &str) -> FinalConfig {
    FinalConfig {
        prefix: prefix.to_owned(),
        entries: raw
            .iter()
            .map(|(key, value)| (format!("{prefix}.{key}"), value.clone()))
            .collect(),
    }
}
