//! Host-level switches read before the agent namespace is resolved.

use crate::defaults::{DEFAULT_NAMESPACE, ENABLED_KEY, NAMESPACE_KEY};
use crate::error::ConfigError;
use crate::logging::LoggingSettings;
use crate::source::PropertySource;

/// Settings governing whether and how the starter runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterSettings {
    /// The starter skips the bootstrap entirely when `false`.
    pub enabled: bool,
    /// Namespace holding the agent settings; also the final key prefix.
    pub namespace: String,
    /// Telemetry settings.
    pub logging: LoggingSettings,
}

impl Default for StarterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            logging: LoggingSettings::default(),
        }
    }
}

impl StarterSettings {
    /// Reads the starter switches from the host.
    ///
    /// A missing `starter.enabled` property counts as enabled.
    pub fn from_source(source: &dyn PropertySource) -> Result<Self, ConfigError> {
        let enabled = match source.property(ENABLED_KEY) {
            None => true,
            Some(text) => match text.trim().to_ascii_lowercase().as_str() {
                "" | "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::invalid_value(
                        ENABLED_KEY,
                        text,
                        "expected 'true' or 'false'",
                    ));
                }
            },
        };
        let namespace = source
            .property(NAMESPACE_KEY)
            .map(|namespace| namespace.trim().trim_end_matches('.').to_owned())
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned());

        Ok(Self {
            enabled,
            namespace,
            logging: LoggingSettings::from_source(source)?,
        })
    }
}
