//! Agent factory double that records constructions for assertions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::agent::{AgentError, AgentFactory, AgentLaunch, ProbeAgent};

/// How the next construction should misbehave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    /// `construct` returns an error.
    Construction(String),
    /// `init` returns an error.
    Init(String),
    /// `init` succeeds but the agent never binds.
    Unbound,
    /// `construct` panics.
    Panic(String),
}

#[derive(Debug, Default)]
struct FactoryState {
    constructions: AtomicUsize,
    launches: Mutex<Vec<AgentLaunch>>,
    failure: Mutex<Option<FailureMode>>,
    delay: Mutex<Option<Duration>>,
}

/// Factory recording every launch it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    state: Arc<FactoryState>,
}

impl RecordingFactory {
    /// Makes subsequent constructions fail.
    pub fn fail_with(&self, mode: FailureMode) {
        *self
            .state
            .failure
            .lock()
            .expect("factory mutex poisoned") = Some(mode);
    }

    /// Slows construction down to widen race windows.
    pub fn delay_construction(&self, delay: Duration) {
        *self.state.delay.lock().expect("factory mutex poisoned") = Some(delay);
    }

    /// Number of times `construct` ran.
    pub fn constructions(&self) -> usize {
        self.state.constructions.load(Ordering::SeqCst)
    }

    /// Launch parameters received so far.
    pub fn launches(&self) -> Vec<AgentLaunch> {
        self.state
            .launches
            .lock()
            .expect("factory mutex poisoned")
            .clone()
    }
}

impl AgentFactory for RecordingFactory {
    type Agent = TestAgent;

    fn construct(&self, launch: &AgentLaunch) -> Result<TestAgent, AgentError> {
        let id = self.state.constructions.fetch_add(1, Ordering::SeqCst);
        self.state
            .launches
            .lock()
            .expect("factory mutex poisoned")
            .push(launch.clone());
        let delay = *self.state.delay.lock().expect("factory mutex poisoned");
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let failure = self
            .state
            .failure
            .lock()
            .expect("factory mutex poisoned")
            .clone();
        match failure {
            Some(FailureMode::Construction(message)) => Err(AgentError::new(message)),
            Some(FailureMode::Panic(message)) => panic!("{message}"),
            Some(FailureMode::Init(message)) => Ok(TestAgent::new(id, Some(message), true)),
            Some(FailureMode::Unbound) => Ok(TestAgent::new(id, None, false)),
            None => Ok(TestAgent::new(id, None, true)),
        }
    }
}

/// Agent double whose start behaviour is scripted by the factory.
#[derive(Debug)]
pub struct TestAgent {
    id: usize,
    init_failure: Option<String>,
    binds: bool,
    bound: AtomicBool,
    init_calls: AtomicUsize,
}

impl TestAgent {
    const fn new(id: usize, init_failure: Option<String>, binds: bool) -> Self {
        Self {
            id,
            init_failure,
            binds,
            bound: AtomicBool::new(false),
            init_calls: AtomicUsize::new(0),
        }
    }

    /// Construction sequence number.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Number of times `init` ran.
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

impl ProbeAgent for TestAgent {
    fn init(&self) -> Result<(), AgentError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.init_failure {
            return Err(AgentError::new(message.clone()));
        }
        self.bound.store(self.binds, Ordering::SeqCst);
        Ok(())
    }

    fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }
}
