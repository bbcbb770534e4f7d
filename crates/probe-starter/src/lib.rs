//! Guaranteed-once bootstrap of the diagnostic agent inside a host process.
//!
//! Hosts call [`Starter::start`] from their startup sequence. The starter
//! reads the host switches, resolves the agent namespace through
//! [`probe_config`], and hands the resulting launch parameters to a
//! [`BootstrapSequencer`], which constructs and initialises the agent at most
//! once per process even when several components request it concurrently.
//!
//! Failures from the agent are final for the process: the sequencer never
//! retries, and every caller receives the same [`BootstrapError`]. Whether a
//! failed bootstrap aborts host startup is the host's decision.
//!
//! ```ignore
//! use probe_starter::{BootstrapSequencer, Starter};
//! use probe_config::EnvPropertySource;
//!
//! static AGENT: BootstrapSequencer<MyAgent> = BootstrapSequencer::new();
//!
//! let starter = Starter::builder()
//!     .property_source(EnvPropertySource::from_process())
//!     .factory(MyAgentFactory)
//!     .build()?;
//! let agent = starter.start(&AGENT)?;
//! ```

mod agent;
mod health;
mod sequencer;
mod starter;
mod telemetry;

pub use agent::{AgentError, AgentFactory, AgentLaunch, ProbeAgent};
pub use health::{BootstrapReporter, StructuredBootstrapReporter};
pub use sequencer::{BootstrapError, BootstrapOutcome, BootstrapSequencer, BootstrapState};
pub use starter::{Collaborator, StartError, Starter, StarterBuilder};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;
