//! Seam between the starter and the diagnostic agent.
//!
//! The agent itself is opaque: the starter only constructs it from an
//! [`AgentLaunch`], calls [`ProbeAgent::init`], and checks that it bound to
//! the process.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use probe_config::{FinalConfig, StructuredProperties};

/// A constructed diagnostic agent.
pub trait ProbeAgent: Send + Sync {
    /// Starts the agent. Failures are final for the bootstrap attempt.
    fn init(&self) -> Result<(), AgentError>;

    /// Returns `true` once the agent is attached to this process.
    fn is_bound(&self) -> bool;
}

/// Builds agents from resolved launch parameters.
pub trait AgentFactory: Send + Sync {
    /// Agent type produced by the factory.
    type Agent: ProbeAgent + 'static;

    /// Constructs an agent without starting it.
    fn construct(&self, launch: &AgentLaunch) -> Result<Self::Agent, AgentError>;
}

/// Parameters handed to [`AgentFactory::construct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLaunch {
    /// Prefixed, fully merged configuration.
    pub config: FinalConfig,
    /// Agent installation directory.
    pub home: Option<Utf8PathBuf>,
    /// Suppresses the agent's startup banner.
    pub silent_init: bool,
    /// Slot reserved by the agent's construction contract; always `None`.
    pub reserved: Option<String>,
}

impl AgentLaunch {
    /// Pairs the final configuration with the typed launch flags.
    #[must_use]
    pub fn new(config: FinalConfig, props: &StructuredProperties) -> Self {
        Self {
            config,
            home: props.home.clone(),
            silent_init: props.silent_init,
            reserved: None,
        }
    }

    /// Agent installation directory, when configured.
    #[must_use]
    pub fn home(&self) -> Option<&Utf8Path> {
        self.home.as_deref()
    }
}

/// Error reported by the agent while constructing or starting.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AgentError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AgentError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}
