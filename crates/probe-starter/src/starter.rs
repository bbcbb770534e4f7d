//! Explicit entry point invoked once at host startup.
//!
//! The [`Starter`] reads the host switches, resolves the agent namespace into
//! a [`probe_config::FinalConfig`], and hands it to a
//! [`BootstrapSequencer`].

use std::sync::Arc;

use strum::Display;
use thiserror::Error;

use probe_config::{
    ConfigError, PropertySource, StarterSettings, StructuredProperties, merge_traced, qualify,
};

use crate::agent::{AgentFactory, AgentLaunch};
use crate::health::{BootstrapReporter, StructuredBootstrapReporter};
use crate::sequencer::{BootstrapError, BootstrapSequencer};
use crate::telemetry::{self, TelemetryError};

/// Collaborators the starter cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Collaborator {
    /// Host property lookup.
    #[strum(serialize = "property source")]
    PropertySource,
    /// Agent constructor.
    #[strum(serialize = "agent factory")]
    AgentFactory,
}

/// Errors surfaced by [`Starter::start`].
#[derive(Debug, Error)]
pub enum StartError {
    /// The starter was built without a required collaborator.
    #[error("probe starter is missing its {collaborator}")]
    MissingCollaborator {
        /// Collaborator that was not supplied.
        collaborator: Collaborator,
    },
    /// Host settings could not be bound.
    #[error("failed to resolve agent configuration: {source}")]
    Configuration {
        /// Underlying binding error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The agent failed to start.
    #[error(transparent)]
    Bootstrap(Arc<BootstrapError>),
}

impl From<ConfigError> for StartError {
    fn from(source: ConfigError) -> Self {
        Self::Configuration { source }
    }
}

/// Builder collecting the starter's collaborators.
pub struct StarterBuilder<F> {
    source: Option<Arc<dyn PropertySource>>,
    factory: Option<F>,
    reporter: Arc<dyn BootstrapReporter>,
    install_telemetry: bool,
}

impl<F> Default for StarterBuilder<F> {
    fn default() -> Self {
        Self {
            source: None,
            factory: None,
            reporter: Arc::new(StructuredBootstrapReporter::new()),
            install_telemetry: true,
        }
    }
}

impl<F> StarterBuilder<F>
where
    F: AgentFactory,
{
    /// Sets the host property source.
    #[must_use]
    pub fn property_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets a property source shared with the host.
    #[must_use]
    pub fn shared_property_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the agent factory.
    #[must_use]
    pub fn factory(mut self, factory: F) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Replaces the default `tracing` reporter.
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn BootstrapReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Leaves subscriber installation to the host.
    #[must_use]
    pub fn without_telemetry(mut self) -> Self {
        self.install_telemetry = false;
        self
    }

    /// Validates that every collaborator is present.
    pub fn build(self) -> Result<Starter<F>, StartError> {
        let source = self.source.ok_or(StartError::MissingCollaborator {
            collaborator: Collaborator::PropertySource,
        })?;
        let factory = self.factory.ok_or(StartError::MissingCollaborator {
            collaborator: Collaborator::AgentFactory,
        })?;
        Ok(Starter {
            source,
            factory,
            reporter: self.reporter,
            install_telemetry: self.install_telemetry,
        })
    }
}

/// Resolves the agent configuration and runs the guarded bootstrap.
pub struct Starter<F> {
    source: Arc<dyn PropertySource>,
    factory: F,
    reporter: Arc<dyn BootstrapReporter>,
    install_telemetry: bool,
}

impl<F> Starter<F>
where
    F: AgentFactory,
{
    /// Starts building a starter.
    #[must_use]
    pub fn builder() -> StarterBuilder<F> {
        StarterBuilder::default()
    }

    /// Reads the host-level switches.
    pub fn settings(&self) -> Result<StarterSettings, StartError> {
        Ok(StarterSettings::from_source(self.source.as_ref())?)
    }

    /// Resolves the launch parameters for the agent namespace.
    ///
    /// The property source is queried afresh on every call; the resulting
    /// maps are owned by the caller.
    pub fn prepare(&self, settings: &StarterSettings) -> Result<AgentLaunch, StartError> {
        let source = self.source.as_ref();
        let namespace = settings.namespace.as_str();
        let raw = source.entries_with_prefix(namespace);
        let props = StructuredProperties::bind(source, namespace)?;

        let traced = merge_traced(&raw, &props, source);
        for key in traced.values().keys() {
            if let Some(origin) = traced.origin(key) {
                tracing::debug!(
                    target: "probe_starter::config",
                    key = %key,
                    origin = %origin,
                    "resolved agent setting"
                );
            }
        }

        let config = qualify(traced.values(), namespace);
        Ok(AgentLaunch::new(config, &props))
    }

    /// Starts the agent through `sequencer`, at most once per sequencer.
    ///
    /// Returns `Ok(None)` when the host disabled the starter. Once another
    /// caller has begun the bootstrap, later calls wait for and return its
    /// outcome without consulting the property source again.
    pub fn start(
        &self,
        sequencer: &BootstrapSequencer<F::Agent>,
    ) -> Result<Option<Arc<F::Agent>>, StartError> {
        if let Some(outcome) = sequencer.join(self.reporter.as_ref()) {
            return outcome.map(Some).map_err(StartError::Bootstrap);
        }

        let settings = self.settings()?;
        if self.install_telemetry {
            initialise_telemetry(&settings)?;
        }
        if !settings.enabled {
            self.reporter.bootstrap_skipped();
            return Ok(None);
        }

        let launch = self.prepare(&settings)?;
        sequencer
            .bootstrap(&self.factory, &launch, self.reporter.as_ref())
            .map(Some)
            .map_err(StartError::Bootstrap)
    }
}

fn initialise_telemetry(settings: &StarterSettings) -> Result<(), StartError> {
    match telemetry::initialise(&settings.logging) {
        Ok(_) => Ok(()),
        Err(TelemetryError::AlreadyInstalled(error)) => {
            // The host installed its own subscriber first; keep using it.
            tracing::warn!(
                target: "probe_starter::health",
                error = %error,
                "global subscriber already installed"
            );
            Ok(())
        }
        Err(source) => Err(StartError::Telemetry { source }),
    }
}
