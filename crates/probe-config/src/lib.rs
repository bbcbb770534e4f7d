//! Configuration resolution for the probe starter.
//!
//! The host exposes its settings through a [`PropertySource`]. Resolution
//! collects the raw entries below the agent namespace, folds their keys into
//! canonical camel case ([`normalize`]), fills gaps from the typed
//! [`StructuredProperties`] ([`apply_defaults`]), then from the host's
//! application identity and the agent's built-in defaults ([`merge`]), and
//! finally prefixes every key with the namespace ([`qualify`]).
//!
//! Precedence is strict and append-only: an entry present in the raw map is
//! never overwritten by the typed object, which in turn is never overwritten
//! by the environment fallbacks. Settings introduced in newer agent releases,
//! reachable only through the raw map, therefore always reach the agent.
//!
//! ```ignore
//! use probe_config::{MapPropertySource, StructuredProperties, resolve};
//!
//! let host = MapPropertySource::new()
//!     .with("probe.tunnel-server", "ws://tunnel")
//!     .with("application.name", "svc");
//! let raw = host.entries_with_prefix("probe");
//! let props = StructuredProperties::bind(&host, "probe")?;
//! let config = resolve(&raw, &props, &host, "probe");
//! assert_eq!(config.get("probe.tunnelServer"), Some("ws://tunnel"));
//! ```

use std::collections::BTreeMap;

mod defaults;
mod error;
mod keys;
mod logging;
mod merge;
mod properties;
mod qualify;
mod settings;
mod source;

pub use defaults::{
    APPLICATION_NAME_KEY, BUILTIN_DEFAULTS, DEFAULT_LOG_FILTER, DEFAULT_NAMESPACE, ENABLED_KEY,
    LOG_FILTER_KEY, LOG_FORMAT_KEY, NAMESPACE_KEY, apply_builtin_defaults, apply_defaults,
    default_log_filter, default_log_format, is_present,
};
pub use error::ConfigError;
pub use keys::{RecognizedField, is_canonical, normalize, normalize_map};
pub use logging::{LogFormat, LoggingSettings};
pub use merge::{TracedConfig, ValueOrigin, merge, merge_traced, resolve};
pub use properties::StructuredProperties;
pub use qualify::{FinalConfig, qualify};
pub use settings::StarterSettings;
pub use source::{
    EnvPropertySource, LayeredPropertySource, MapPropertySource, PropertySource, SourceError,
    TomlPropertySource, env_name,
};

/// Generic key/value bag collected from a namespace.
pub type RawConfigMap = BTreeMap<String, String>;
