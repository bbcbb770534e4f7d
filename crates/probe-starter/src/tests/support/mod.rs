//! Test harness utilities for the bootstrap suites.

mod agent;
mod reporter;
mod world;

pub use agent::{FailureMode, RecordingFactory, TestAgent};
pub use reporter::{BootstrapEvent, PanickingReporter, RecordingReporter};
pub use world::{TestWorld, world};
