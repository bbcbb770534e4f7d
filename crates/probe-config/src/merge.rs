//! Precedence merge across the configuration tiers.
//!
//! Tiers, highest first:
//!
//! 1. entries of the raw namespace map,
//! 2. fields of [`StructuredProperties`],
//! 3. the host's application identity (`application.name`),
//! 4. the agent's built-in defaults.
//!
//! The merge is append-only: a key set by a higher tier is never touched by a
//! lower one. Precedence is total, so no input can produce a conflict.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::Display;

use crate::RawConfigMap;
use crate::defaults::{
    APPLICATION_NAME_KEY, apply_builtin_defaults, apply_defaults, is_present,
};
use crate::keys::{RecognizedField, normalize_map};
use crate::properties::StructuredProperties;
use crate::qualify::{FinalConfig, qualify};
use crate::source::PropertySource;

/// Tier that supplied a merged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueOrigin {
    /// The raw namespace map.
    Raw,
    /// The structured properties object.
    Structured,
    /// The host's application identity property.
    ApplicationIdentity,
    /// The agent's built-in defaults.
    BuiltIn,
}

/// Merged map along with the tier that supplied each entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedConfig {
    values: RawConfigMap,
    origins: BTreeMap<String, ValueOrigin>,
}

impl TracedConfig {
    /// The merged, normalized entries.
    #[must_use]
    pub const fn values(&self) -> &RawConfigMap {
        &self.values
    }

    /// Tier that supplied `key`, when the key is present.
    #[must_use]
    pub fn origin(&self, key: &str) -> Option<ValueOrigin> {
        self.origins.get(key).copied()
    }

    /// Consumes the trace, keeping only the merged entries.
    #[must_use]
    pub fn into_values(self) -> RawConfigMap {
        self.values
    }

    fn record(&mut self, keys: impl IntoIterator<Item = impl Into<String>>, origin: ValueOrigin) {
        for key in keys {
            self.origins.insert(key.into(), origin);
        }
    }
}

/// Merges the tiers and records where each value came from.
#[must_use]
pub fn merge_traced(
    raw: &RawConfigMap,
    props: &StructuredProperties,
    source: &dyn PropertySource,
) -> TracedConfig {
    let mut traced = TracedConfig {
        values: normalize_map(raw),
        origins: BTreeMap::new(),
    };
    let raw_keys: Vec<String> = traced.values.keys().cloned().collect();
    traced.record(raw_keys, ValueOrigin::Raw);

    let structured = apply_defaults(&mut traced.values, props);
    traced.record(structured, ValueOrigin::Structured);

    if let Some(key) = apply_application_name(&mut traced.values, source) {
        traced.record([key], ValueOrigin::ApplicationIdentity);
    }

    let builtin = apply_builtin_defaults(&mut traced.values);
    traced.record(builtin, ValueOrigin::BuiltIn);

    traced
}

/// Merges the raw map with the lower-precedence tiers.
#[must_use]
pub fn merge(
    raw: &RawConfigMap,
    props: &StructuredProperties,
    source: &dyn PropertySource,
) -> RawConfigMap {
    merge_traced(raw, props, source).into_values()
}

/// Runs the whole pipeline and qualifies the result with `prefix`.
///
/// Repeated calls on the same inputs return identical maps.
#[must_use]
pub fn resolve(
    raw: &RawConfigMap,
    props: &StructuredProperties,
    source: &dyn PropertySource,
    prefix: &str,
) -> FinalConfig {
    qualify(&merge(raw, props, source), prefix)
}

fn apply_application_name(
    raw: &mut RawConfigMap,
    source: &dyn PropertySource,
) -> Option<&'static str> {
    let key = RecognizedField::AppName.key();
    if is_present(raw, key) {
        return None;
    }
    let name = source
        .property(APPLICATION_NAME_KEY)
        .filter(|name| !name.is_empty())?;
    raw.insert(key.to_owned(), name);
    Some(key)
}
