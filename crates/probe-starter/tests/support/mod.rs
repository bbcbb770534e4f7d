//! Minimal agent shared by the process-level telemetry suites.

use probe_config::MapPropertySource;
use probe_starter::{AgentError, AgentFactory, AgentLaunch, ProbeAgent, Starter};

/// Agent that starts and binds immediately.
#[derive(Debug)]
pub struct QuietAgent;

impl ProbeAgent for QuietAgent {
    fn init(&self) -> Result<(), AgentError> {
        Ok(())
    }

    fn is_bound(&self) -> bool {
        true
    }
}

/// Factory producing [`QuietAgent`]s.
#[derive(Debug, Clone, Copy)]
pub struct QuietFactory;

impl AgentFactory for QuietFactory {
    type Agent = QuietAgent;

    fn construct(&self, _launch: &AgentLaunch) -> Result<QuietAgent, AgentError> {
        Ok(QuietAgent)
    }
}

/// Starter that installs telemetry from `host`.
pub fn starter(host: MapPropertySource) -> Starter<QuietFactory> {
    Starter::builder()
        .property_source(host)
        .factory(QuietFactory)
        .build()
        .expect("starter should build")
}
