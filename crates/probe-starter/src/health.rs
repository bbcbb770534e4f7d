//! Structured reporting for bootstrap lifecycle events.

use std::sync::Arc;

use crate::agent::AgentLaunch;
use crate::sequencer::{BootstrapError, BootstrapState};

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait BootstrapReporter: Send + Sync {
    /// Invoked when the starter is disabled and skips the bootstrap.
    fn bootstrap_skipped(&self);

    /// Invoked by the caller that won the right to construct the agent.
    fn bootstrap_starting(&self, launch: &AgentLaunch);

    /// Invoked once the agent has started and bound to the process.
    fn agent_started(&self, launch: &AgentLaunch);

    /// Invoked when the bootstrap attempt fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a caller receives the outcome of an earlier attempt.
    fn bootstrap_joined(&self, state: BootstrapState);
}

impl<T> BootstrapReporter for Arc<T>
where
    T: BootstrapReporter + ?Sized,
{
    fn bootstrap_skipped(&self) {
        (**self).bootstrap_skipped();
    }

    fn bootstrap_starting(&self, launch: &AgentLaunch) {
        (**self).bootstrap_starting(launch);
    }

    fn agent_started(&self, launch: &AgentLaunch) {
        (**self).agent_started(launch);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn bootstrap_joined(&self, state: BootstrapState) {
        (**self).bootstrap_joined(state);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
///
/// Configuration values are never logged; they may carry tunnel credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredBootstrapReporter;

impl StructuredBootstrapReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BootstrapReporter for StructuredBootstrapReporter {
    fn bootstrap_skipped(&self) {
        tracing::info!(
            target: "probe_starter::health",
            event = "bootstrap_skipped",
            "probe starter disabled, agent not started"
        );
    }

    fn bootstrap_starting(&self, launch: &AgentLaunch) {
        tracing::debug!(
            target: "probe_starter::health",
            event = "bootstrap_starting",
            namespace = %launch.config.prefix(),
            entries = launch.config.len(),
            home = ?launch.home(),
            silent_init = launch.silent_init,
            "starting agent bootstrap"
        );
    }

    fn agent_started(&self, launch: &AgentLaunch) {
        tracing::info!(
            target: "probe_starter::health",
            event = "agent_started",
            namespace = %launch.config.prefix(),
            "agent start success"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "probe_starter::health",
            event = "bootstrap_failed",
            error = %error,
            "agent bootstrap failed"
        );
    }

    fn bootstrap_joined(&self, state: BootstrapState) {
        tracing::debug!(
            target: "probe_starter::health",
            event = "bootstrap_joined",
            state = %state,
            "reusing outcome of the earlier bootstrap attempt"
        );
    }
}
