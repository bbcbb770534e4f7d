//! Read-only property sources consulted by the resolution pipeline.
//!
//! A source answers two questions: the value of a single well-known key, and
//! every entry below a namespace. Hosts usually stack the process environment
//! on top of a TOML file through [`LayeredPropertySource`].

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::RawConfigMap;
use crate::error::ConfigError;
use crate::keys::normalize_map;

/// Read-only key lookup over a namespaced configuration tree.
pub trait PropertySource: Send + Sync {
    /// Returns the value stored under the fully-qualified `key`.
    fn property(&self, key: &str) -> Option<String>;

    /// Returns every entry below `namespace`, with the `namespace.` prefix
    /// removed from the keys.
    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap;
}

impl<T> PropertySource for Arc<T>
where
    T: PropertySource + ?Sized,
{
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        (**self).entries_with_prefix(namespace)
    }
}

impl<T> PropertySource for &T
where
    T: PropertySource + ?Sized,
{
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        (**self).entries_with_prefix(namespace)
    }
}

/// Errors raised while loading a file-backed source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// File that failed to load.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The file was not valid TOML.
    #[error("failed to parse configuration file '{path}': {source}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },
}

/// In-memory source backed by a map of fully-qualified keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapPropertySource {
    values: BTreeMap<String, String>,
}

impl MapPropertySource {
    /// Builds an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the updated source.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Stores or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapPropertySource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl PropertySource for MapPropertySource {
    fn property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        entries_below(&self.values, namespace)
    }
}

/// Snapshot of environment variables with relaxed key binding.
///
/// `probe.http-port`, `probe.httpPort` and `probe.http_port` all read
/// `PROBE_HTTP_PORT`. Namespace enumeration maps `PROBE_TUNNEL_SERVER` back to
/// `tunnel-server`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvPropertySource {
    variables: BTreeMap<String, String>,
}

impl EnvPropertySource {
    /// Captures the current process environment. Variables whose name or value
    /// is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_vars(env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Builds a source from explicit variables.
    #[must_use]
    pub fn from_vars<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: variables
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Debug for EnvPropertySource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values may hold credentials.
        formatter
            .debug_struct("EnvPropertySource")
            .field("variables", &self.variables.len())
            .finish()
    }
}

impl PropertySource for EnvPropertySource {
    fn property(&self, key: &str) -> Option<String> {
        self.variables.get(&env_name(key)).cloned()
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        let prefix = format!("{}_", env_name(namespace));
        self.variables
            .iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(prefix.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                Some((rest.to_lowercase().replace('_', "-"), value.clone()))
            })
            .collect()
    }
}

/// Maps a dotted property key onto the conventional environment variable.
///
/// Separators become `_`, camel-case boundaries gain an `_`, and the result
/// is upper-cased.
#[must_use]
pub fn env_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    let mut previous_lower = false;
    for character in key.chars() {
        if character.is_alphanumeric() {
            if character.is_uppercase() && previous_lower {
                name.push('_');
            }
            name.extend(character.to_uppercase());
            previous_lower = character.is_lowercase() || character.is_numeric();
        } else {
            if !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
            previous_lower = false;
        }
    }
    name
}

/// Source backed by a TOML document flattened into dotted keys.
///
/// Nested tables contribute their path (`[probe] http-port = 1` becomes
/// `probe.http-port`). Arrays of scalars are joined with commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TomlPropertySource {
    origin: Option<Utf8PathBuf>,
    values: BTreeMap<String, String>,
}

impl TomlPropertySource {
    /// Reads and flattens the file at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, SourceError> {
        let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut parsed = Self::parse(&contents).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        parsed.origin = Some(path.to_path_buf());
        Ok(parsed)
    }

    /// Flattens an in-memory TOML document.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let table = contents.parse::<toml::Table>()?;
        let mut values = BTreeMap::new();
        flatten_table(None, &table, &mut values);
        Ok(Self {
            origin: None,
            values,
        })
    }

    /// File the source was loaded from, when any.
    #[must_use]
    pub fn origin(&self) -> Option<&Utf8Path> {
        self.origin.as_deref()
    }
}

impl PropertySource for TomlPropertySource {
    fn property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        entries_below(&self.values, namespace)
    }
}

fn flatten_table(prefix: Option<&str>, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let path = match prefix {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        match value {
            toml::Value::Table(nested) => flatten_table(Some(&path), nested, out),
            toml::Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(",");
                out.insert(path, joined);
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    out.insert(path, text);
                }
            }
        }
    }
}

fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        toml::Value::Boolean(flag) => Some(flag.to_string()),
        toml::Value::Datetime(datetime) => Some(datetime.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

fn entries_below(values: &BTreeMap<String, String>, namespace: &str) -> RawConfigMap {
    let prefix = format!("{namespace}.");
    values
        .iter()
        .filter_map(|(key, value)| {
            let rest = key.strip_prefix(prefix.as_str())?;
            (!rest.is_empty()).then(|| (rest.to_owned(), value.clone()))
        })
        .collect()
}

/// Stack of sources where the first layer to answer wins.
#[derive(Default)]
pub struct LayeredPropertySource {
    layers: Vec<Box<dyn PropertySource>>,
}

impl LayeredPropertySource {
    /// Builds an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stacks `environment` over the TOML file at `path`.
    ///
    /// A missing or malformed file aborts resolution; hosts without a file
    /// layer the environment alone.
    pub fn environment_over_file(
        environment: EnvPropertySource,
        path: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let file = TomlPropertySource::load(path)?;
        Ok(Self::new().with_layer(environment).with_layer(file))
    }

    /// Appends a layer with lower precedence than those already present.
    #[must_use]
    pub fn with_layer(mut self, layer: impl PropertySource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Number of layers in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` when the stack holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for LayeredPropertySource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LayeredPropertySource")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl PropertySource for LayeredPropertySource {
    fn property(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.property(key))
    }

    fn entries_with_prefix(&self, namespace: &str) -> RawConfigMap {
        // Layers spell keys differently, so compare them in canonical form.
        let mut merged = RawConfigMap::new();
        for layer in &self.layers {
            for (key, value) in normalize_map(&layer.entries_with_prefix(namespace)) {
                merged.entry(key).or_insert(value);
            }
        }
        merged
    }
}
