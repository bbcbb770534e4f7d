use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{LOG_FILTER_KEY, LOG_FORMAT_KEY, default_log_filter, default_log_format};
use crate::error::ConfigError;
use crate::source::PropertySource;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Log filter and format used when installing telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `tracing` filter expression.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter().to_owned(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Reads the logging settings from the host, falling back to defaults.
    pub fn from_source(source: &dyn PropertySource) -> Result<Self, ConfigError> {
        let filter = source
            .property(LOG_FILTER_KEY)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| default_log_filter().to_owned());
        let format = match source.property(LOG_FORMAT_KEY) {
            Some(text) if !text.trim().is_empty() => {
                LogFormat::from_str(text.trim()).map_err(|error| {
                    ConfigError::invalid_value(LOG_FORMAT_KEY, text.as_str(), error.to_string())
                })?
            }
            _ => default_log_format(),
        };
        Ok(Self { filter, format })
    }
}
