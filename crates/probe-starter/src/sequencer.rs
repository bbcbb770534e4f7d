//! Guaranteed-once bootstrap of the agent.
//!
//! The sequencer holds the process-wide [`BootstrapState`] register. The
//! first caller moves it from `Uninitialized` to `Initializing` with a single
//! compare-and-set and performs the construction; every other caller blocks
//! until that attempt settles and receives the same outcome. `Ready` and
//! `Failed` are terminal: a failed attempt is never retried within the
//! process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;
use strum::Display;
use thiserror::Error;

use crate::agent::{AgentError, AgentFactory, AgentLaunch, ProbeAgent};
use crate::health::BootstrapReporter;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

/// Lifecycle of the agent within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BootstrapState {
    /// No bootstrap has been attempted.
    Uninitialized,
    /// A caller is constructing the agent.
    Initializing,
    /// The agent started and is cached for the process lifetime.
    Ready,
    /// The only bootstrap attempt failed.
    Failed,
}

impl BootstrapState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            UNINITIALIZED => Self::Uninitialized,
            INITIALIZING => Self::Initializing,
            READY => Self::Ready,
            _ => Self::Failed,
        }
    }

    /// Returns `true` for `Ready` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Errors that end a bootstrap attempt.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The agent could not be constructed.
    #[error("agent construction failed: {source}")]
    Construction {
        /// Error reported by the factory.
        #[source]
        source: AgentError,
    },
    /// The agent was constructed but failed to start.
    #[error("agent initialisation failed: {source}")]
    Initialisation {
        /// Error reported by [`ProbeAgent::init`].
        #[source]
        source: AgentError,
    },
    /// `init` returned `Ok` but the agent did not report itself bound to the
    /// process afterwards.
    ///
    /// Agents that attach lazily must bind before `init` returns; a false
    /// [`ProbeAgent::is_bound`] at that point is terminal like any other
    /// failure.
    #[error("agent reported a successful start but is not bound to the process")]
    Unbound,
    /// The factory or the agent panicked.
    #[error("agent bootstrap panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

/// Outcome shared by every caller of [`BootstrapSequencer::bootstrap`].
pub type BootstrapOutcome<A> = Result<Arc<A>, Arc<BootstrapError>>;

/// Atomic state register guarding the single agent instance.
///
/// Construct it in a `static` to get one agent per process:
///
/// ```ignore
/// static AGENT: BootstrapSequencer<MyAgent> = BootstrapSequencer::new();
/// ```
pub struct BootstrapSequencer<A> {
    state: AtomicU8,
    outcome: OnceCell<BootstrapOutcome<A>>,
}

impl<A> Default for BootstrapSequencer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for BootstrapSequencer<A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BootstrapSequencer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<A> BootstrapSequencer<A> {
    /// Builds a sequencer in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            outcome: OnceCell::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BootstrapState {
        BootstrapState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Settled outcome, without blocking.
    #[must_use]
    pub fn outcome(&self) -> Option<&BootstrapOutcome<A>> {
        self.outcome.get()
    }

    /// The running agent, once `Ready`.
    #[must_use]
    pub fn agent(&self) -> Option<Arc<A>> {
        self.outcome()
            .and_then(|outcome| outcome.as_ref().ok())
            .map(Arc::clone)
    }

    /// Shares the outcome of a bootstrap another caller already began.
    ///
    /// Returns `None` while the sequencer is `Uninitialized`. Otherwise blocks
    /// until the attempt settles.
    #[must_use]
    pub fn join(&self, reporter: &dyn BootstrapReporter) -> Option<BootstrapOutcome<A>> {
        if self.state() == BootstrapState::Uninitialized {
            return None;
        }
        Some(self.await_outcome(reporter))
    }

    fn await_outcome(&self, reporter: &dyn BootstrapReporter) -> BootstrapOutcome<A> {
        let outcome = self.outcome.wait().clone();
        reporter.bootstrap_joined(if outcome.is_ok() {
            BootstrapState::Ready
        } else {
            BootstrapState::Failed
        });
        outcome
    }
}

impl<A> BootstrapSequencer<A>
where
    A: ProbeAgent + 'static,
{
    /// Constructs and starts the agent exactly once per sequencer.
    ///
    /// The caller that wins the `Uninitialized → Initializing` transition
    /// invokes the factory. Concurrent and later callers never construct a
    /// second agent; they wait for the winner and share its outcome, whether
    /// that is the agent handle or the error that ended the attempt.
    pub fn bootstrap<F>(
        &self,
        factory: &F,
        launch: &AgentLaunch,
        reporter: &dyn BootstrapReporter,
    ) -> BootstrapOutcome<A>
    where
        F: AgentFactory<Agent = A> + ?Sized,
    {
        let acquired = self
            .state
            .compare_exchange(
                UNINITIALIZED,
                INITIALIZING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if !acquired {
            return self.await_outcome(reporter);
        }

        let outcome = self
            .outcome
            .get_or_init(|| launch_agent(factory, launch, reporter).map_err(Arc::new))
            .clone();
        let settled = if outcome.is_ok() { READY } else { FAILED };
        self.state.store(settled, Ordering::Release);

        match &outcome {
            Ok(_) => reporter.agent_started(launch),
            Err(error) => reporter.bootstrap_failed(error),
        }
        outcome
    }

    /// Returns `true` when the agent is running and attached to the process.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.agent().is_some_and(|agent| agent.is_bound())
    }
}

fn launch_agent<F>(
    factory: &F,
    launch: &AgentLaunch,
    reporter: &dyn BootstrapReporter,
) -> Result<Arc<F::Agent>, BootstrapError>
where
    F: AgentFactory + ?Sized,
{
    // Waiters block until the outcome is published, so a panic anywhere
    // between the state transition and publication must still settle it.
    panic::catch_unwind(AssertUnwindSafe(|| {
        reporter.bootstrap_starting(launch);
        construct_and_init(factory, launch)
    }))
    .unwrap_or_else(|payload| {
        Err(BootstrapError::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn construct_and_init<F>(factory: &F, launch: &AgentLaunch) -> Result<Arc<F::Agent>, BootstrapError>
where
    F: AgentFactory + ?Sized,
{
    let agent = factory
        .construct(launch)
        .map_err(|source| BootstrapError::Construction { source })?;
    agent
        .init()
        .map_err(|source| BootstrapError::Initialisation { source })?;
    if !agent.is_bound() {
        return Err(BootstrapError::Unbound);
    }
    Ok(Arc::new(agent))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UNINITIALIZED, BootstrapState::Uninitialized, false)]
    #[case(INITIALIZING, BootstrapState::Initializing, false)]
    #[case(READY, BootstrapState::Ready, true)]
    #[case(FAILED, BootstrapState::Failed, true)]
    fn decodes_state_register(
        #[case] raw: u8,
        #[case] expected: BootstrapState,
        #[case] terminal: bool,
    ) {
        let state = BootstrapState::from_raw(raw);

        assert_eq!(state, expected);
        assert_eq!(state.is_terminal(), terminal);
    }

    #[test]
    fn renders_panic_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let opaque: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(opaque.as_ref()), "non-string panic payload");
    }
}
