use strum::IntoEnumIterator;

use crate::RawConfigMap;
use crate::keys::RecognizedField;
use crate::properties::StructuredProperties;

/// Namespace that holds the agent settings and prefixes the final keys.
pub const DEFAULT_NAMESPACE: &str = "probe";

/// Host property naming the application.
pub const APPLICATION_NAME_KEY: &str = "application.name";

/// Host property that turns the starter off when set to `false`.
pub const ENABLED_KEY: &str = "starter.enabled";

/// Host property overriding the agent namespace.
pub const NAMESPACE_KEY: &str = "starter.namespace";

/// Host property holding the log filter expression.
pub const LOG_FILTER_KEY: &str = "starter.log-filter";

/// Host property holding the log output format.
pub const LOG_FORMAT_KEY: &str = "starter.log-format";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings the agent receives unless any other tier supplies them.
pub const BUILTIN_DEFAULTS: &[(&str, &str)] = &[("disabledCommands", "stop")];

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Returns `true` when `key` holds a non-empty value.
///
/// Empty strings count as absent so lower tiers may fill them.
#[must_use]
pub fn is_present(raw: &RawConfigMap, key: &str) -> bool {
    raw.get(key).is_some_and(|value| !value.is_empty())
}

/// Fills recognized fields missing from `raw` with values from `props`.
///
/// Entries already present in `raw` are never replaced. Returns the keys that
/// were inserted; a second application inserts nothing.
pub fn apply_defaults(raw: &mut RawConfigMap, props: &StructuredProperties) -> Vec<&'static str> {
    let mut inserted = Vec::new();
    for field in RecognizedField::iter() {
        if is_present(raw, field.key()) {
            continue;
        }
        if let Some(value) = props.value_of(field) {
            raw.insert(field.key().to_owned(), value);
            inserted.push(field.key());
        }
    }
    inserted
}

/// Inserts [`BUILTIN_DEFAULTS`] for keys no other tier supplied.
pub fn apply_builtin_defaults(raw: &mut RawConfigMap) -> Vec<&'static str> {
    let mut inserted = Vec::new();
    for (key, value) in BUILTIN_DEFAULTS {
        if !is_present(raw, key) {
            raw.insert((*key).to_owned(), (*value).to_owned());
            inserted.push(*key);
        }
    }
    inserted
}
