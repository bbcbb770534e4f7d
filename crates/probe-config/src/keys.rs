//! Canonical key spelling for namespaced configuration entries.
//!
//! Hosts spell the same setting in several ways (`tunnel-server`,
//! `tunnel_server`, `tunnelServer`). Every key is folded into the camel-case
//! form used by the agent so that entries supplied under different naming
//! conventions collide.

use strum::{Display, EnumIter};

use crate::RawConfigMap;

/// Fields shared by the raw map and [`crate::StructuredProperties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum RecognizedField {
    /// HTTP listener port.
    #[strum(serialize = "httpPort")]
    HttpPort,
    /// Telnet listener port.
    #[strum(serialize = "telnetPort")]
    TelnetPort,
    /// Bind address for the listeners.
    #[strum(serialize = "ip")]
    Ip,
    /// Remote tunnel endpoint.
    #[strum(serialize = "tunnelServer")]
    TunnelServer,
    /// Application identity reported by the agent.
    #[strum(serialize = "appName")]
    AppName,
}

impl RecognizedField {
    /// Canonical key under which the field appears in a raw map.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::HttpPort => "httpPort",
            Self::TelnetPort => "telnetPort",
            Self::Ip => "ip",
            Self::TunnelServer => "tunnelServer",
            Self::AppName => "appName",
        }
    }
}

/// Folds a key into its canonical camel-case spelling.
///
/// Every character that is neither alphanumeric nor `.` acts as a separator
/// and is removed; the first character after a separator is upper-cased.
/// Separators at the start of a dotted segment are dropped without changing
/// the case of what follows.
///
/// ```ignore
/// assert_eq!(normalize("tunnel-server"), "tunnelServer");
/// assert_eq!(normalize("session.timeout_ms"), "session.timeoutMs");
/// ```
#[must_use]
pub fn normalize(key: &str) -> String {
    let mut normalised = String::with_capacity(key.len());
    let mut segment_started = false;
    let mut capitalise_next = false;

    for character in key.chars() {
        if character == '.' {
            normalised.push(character);
            segment_started = false;
            capitalise_next = false;
        } else if character.is_alphanumeric() {
            if capitalise_next && segment_started {
                normalised.extend(character.to_uppercase());
            } else {
                normalised.push(character);
            }
            segment_started = true;
            capitalise_next = false;
        } else {
            capitalise_next = true;
        }
    }

    normalised
}

/// Returns `true` when the key is already in canonical form.
#[must_use]
pub fn is_canonical(key: &str) -> bool {
    normalize(key) == key
}

/// Normalizes every key of a raw map.
///
/// When two spellings collapse onto the same canonical key, the entry that
/// was already canonical wins. Among relaxed spellings, the lexically first
/// key wins.
#[must_use]
pub fn normalize_map(raw: &RawConfigMap) -> RawConfigMap {
    let (canonical, relaxed): (Vec<_>, Vec<_>) =
        raw.iter().partition(|(key, _)| is_canonical(key));

    let mut normalised = RawConfigMap::new();
    for (key, value) in canonical.into_iter().chain(relaxed) {
        normalised
            .entry(normalize(key))
            .or_insert_with(|| value.clone());
    }
    normalised
}
