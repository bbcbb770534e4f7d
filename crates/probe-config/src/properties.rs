//! Strongly-typed view of the agent namespace.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keys::{RecognizedField, normalize_map};
use crate::source::PropertySource;

/// Fixed-schema settings bound once at host startup.
///
/// Ports use `0` and strings use `None` (or the empty string) to signal that
/// the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredProperties {
    /// HTTP listener port, `0` when unset.
    pub http_port: u16,
    /// Telnet listener port, `0` when unset.
    pub telnet_port: u16,
    /// Bind address for the listeners.
    pub ip: Option<String>,
    /// Remote tunnel endpoint.
    pub tunnel_server: Option<String>,
    /// Application identity reported by the agent.
    pub app_name: Option<String>,
    /// Agent installation directory.
    pub home: Option<Utf8PathBuf>,
    /// Suppresses the agent's startup banner.
    #[serde(alias = "slientInit")]
    pub silent_init: bool,
}

impl StructuredProperties {
    /// Binds the typed fields from the entries below `namespace`.
    ///
    /// Keys are matched in canonical form, so `http-port` and `httpPort` bind
    /// the same field. The agent's historical `slientInit` spelling is
    /// accepted alongside `silentInit`. Empty values leave a field unset.
    pub fn bind(source: &dyn PropertySource, namespace: &str) -> Result<Self, ConfigError> {
        let entries = normalize_map(&source.entries_with_prefix(namespace));
        let lookup = |key: &str| {
            entries
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            http_port: parse_port(namespace, "httpPort", lookup("httpPort"))?,
            telnet_port: parse_port(namespace, "telnetPort", lookup("telnetPort"))?,
            ip: lookup("ip").map(str::to_owned),
            tunnel_server: lookup("tunnelServer").map(str::to_owned),
            app_name: lookup("appName").map(str::to_owned),
            home: lookup("home").map(Utf8PathBuf::from),
            silent_init: parse_flag(
                namespace,
                "silentInit",
                lookup("silentInit").or_else(|| lookup("slientInit")),
            )?,
        })
    }

    /// Returns the textual value of a recognized field when it is set.
    #[must_use]
    pub fn value_of(&self, field: RecognizedField) -> Option<String> {
        match field {
            RecognizedField::HttpPort => port_text(self.http_port),
            RecognizedField::TelnetPort => port_text(self.telnet_port),
            RecognizedField::Ip => text(self.ip.as_deref()),
            RecognizedField::TunnelServer => text(self.tunnel_server.as_deref()),
            RecognizedField::AppName => text(self.app_name.as_deref()),
        }
    }

    /// Agent installation directory, when configured.
    #[must_use]
    pub fn home(&self) -> Option<&Utf8Path> {
        self.home.as_deref()
    }
}

fn port_text(port: u16) -> Option<String> {
    (port != 0).then(|| port.to_string())
}

fn text(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_owned)
}

fn parse_port(namespace: &str, field: &str, value: Option<&str>) -> Result<u16, ConfigError> {
    value.map_or(Ok(0), |value| {
        value.parse::<u16>().map_err(|error| {
            ConfigError::invalid_value(format!("{namespace}.{field}"), value, error.to_string())
        })
    })
}

fn parse_flag(namespace: &str, field: &str, value: Option<&str>) -> Result<bool, ConfigError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ConfigError::invalid_value(
            format!("{namespace}.{field}"),
            other,
            "expected 'true' or 'false'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapPropertySource;

    #[test]
    fn binds_relaxed_keys() {
        let source = MapPropertySource::new()
            .with("probe.http-port", "8563")
            .with("probe.telnet_port", "3658")
            .with("probe.tunnel-server", "ws://tunnel")
            .with("probe.app-name", "svc")
            .with("probe.home", "/opt/probe")
            .with("probe.slient-init", "TRUE");

        let props = StructuredProperties::bind(&source, "probe").expect("bind");

        assert_eq!(props.http_port, 8563);
        assert_eq!(props.telnet_port, 3658);
        assert_eq!(props.tunnel_server.as_deref(), Some("ws://tunnel"));
        assert_eq!(props.app_name.as_deref(), Some("svc"));
        assert_eq!(props.home().map(Utf8Path::as_str), Some("/opt/probe"));
        assert!(props.silent_init);
        assert!(props.ip.is_none());
    }

    #[test]
    fn empty_values_leave_fields_unset() {
        let source = MapPropertySource::new()
            .with("probe.httpPort", "")
            .with("probe.ip", " ");

        let props = StructuredProperties::bind(&source, "probe").expect("bind");

        assert_eq!(props, StructuredProperties::default());
    }

    #[test]
    fn rejects_non_numeric_port() {
        let source = MapPropertySource::new().with("probe.telnetPort", "telnet");

        let error = StructuredProperties::bind(&source, "probe").expect_err("invalid port");

        assert!(matches!(
            error,
            ConfigError::InvalidValue { ref key, .. } if key == "probe.telnetPort"
        ));
    }

    #[test]
    fn rejects_non_boolean_flag() {
        let source = MapPropertySource::new().with("probe.silentInit", "sometimes");

        let error = StructuredProperties::bind(&source, "probe").expect_err("invalid flag");

        assert!(error.to_string().contains("probe.silentInit"));
    }

    #[test]
    fn sentinel_values_report_unset() {
        let props = StructuredProperties {
            http_port: 0,
            app_name: Some(String::new()),
            ip: Some("0.0.0.0".to_owned()),
            ..StructuredProperties::default()
        };

        assert_eq!(props.value_of(RecognizedField::HttpPort), None);
        assert_eq!(props.value_of(RecognizedField::AppName), None);
        assert_eq!(
            props.value_of(RecognizedField::Ip).as_deref(),
            Some("0.0.0.0")
        );
    }
}
