//! Shared state for the bootstrap behaviour scenarios.

use std::cell::RefCell;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use probe_config::MapPropertySource;

use crate::sequencer::BootstrapSequencer;
use crate::starter::{StartError, Starter};

use super::agent::{RecordingFactory, TestAgent};
use super::reporter::RecordingReporter;

/// Result of a single `Starter::start` call.
pub type StartResult = Result<Option<Arc<TestAgent>>, StartError>;

/// World carried between scenario steps.
pub struct TestWorld {
    pub host: MapPropertySource,
    pub factory: RecordingFactory,
    pub reporter: Arc<RecordingReporter>,
    pub sequencer: BootstrapSequencer<TestAgent>,
    pub results: Vec<StartResult>,
}

impl TestWorld {
    /// Builds a world with an empty host and a healthy factory.
    pub fn new() -> Self {
        Self {
            host: MapPropertySource::new(),
            factory: RecordingFactory::default(),
            reporter: Arc::new(RecordingReporter::default()),
            sequencer: BootstrapSequencer::new(),
            results: Vec::new(),
        }
    }

    fn starter(&self) -> Starter<RecordingFactory> {
        Starter::builder()
            .property_source(self.host.clone())
            .factory(self.factory.clone())
            .reporter(self.reporter.clone())
            .without_telemetry()
            .build()
            .expect("starter should build")
    }

    /// Runs the starter once on the current thread.
    pub fn start(&mut self) {
        let result = self.starter().start(&self.sequencer);
        self.results.push(result);
    }

    /// Runs the starter from `callers` threads at once.
    pub fn start_concurrently(&mut self, callers: usize) {
        self.factory.delay_construction(Duration::from_millis(20));
        let starter = self.starter();
        let sequencer = &self.sequencer;
        let results: Vec<StartResult> = thread::scope(|scope| {
            let handles: Vec<_> = (0..callers)
                .map(|_| scope.spawn(|| starter.start(sequencer)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("caller thread panicked"))
                .collect()
        });
        self.results.extend(results);
    }
}

/// Fixture constructor shared by the scenario bindings.
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
