//! Test double for [`BootstrapReporter`] that records structured events for
//! assertions.

use std::sync::Mutex;

use crate::agent::AgentLaunch;
use crate::health::BootstrapReporter;
use crate::sequencer::{BootstrapError, BootstrapState};

/// Structured bootstrap events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BootstrapEvent {
    /// The starter was disabled.
    Skipped,
    /// A caller began constructing the agent.
    Starting,
    /// The agent started.
    Started,
    /// The attempt failed with an error description.
    Failed(String),
    /// A caller reused an earlier outcome.
    Joined(BootstrapState),
}

/// Records bootstrap events for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<BootstrapEvent>>,
}

impl RecordingReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<BootstrapEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    /// Counts events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BootstrapEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    fn record(&self, event: BootstrapEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl BootstrapReporter for RecordingReporter {
    fn bootstrap_skipped(&self) {
        self.record(BootstrapEvent::Skipped);
    }

    fn bootstrap_starting(&self, _launch: &AgentLaunch) {
        self.record(BootstrapEvent::Starting);
    }

    fn agent_started(&self, _launch: &AgentLaunch) {
        self.record(BootstrapEvent::Started);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(BootstrapEvent::Failed(error.to_string()));
    }

    fn bootstrap_joined(&self, state: BootstrapState) {
        self.record(BootstrapEvent::Joined(state));
    }
}

/// Reporter whose start hook panics, as a faulty host observer would.
#[derive(Debug, Default)]
pub struct PanickingReporter;

impl BootstrapReporter for PanickingReporter {
    fn bootstrap_skipped(&self) {}

    fn bootstrap_starting(&self, _launch: &AgentLaunch) {
        panic!("reporter exploded");
    }

    fn agent_started(&self, _launch: &AgentLaunch) {}

    fn bootstrap_failed(&self, _error: &BootstrapError) {}

    fn bootstrap_joined(&self, _state: BootstrapState) {}
}
