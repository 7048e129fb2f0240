// sweep-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use super::{RunConfiguration, RunStatus, Transcoder};
use crate::error::{CoreError, CoreResult};
use crate::processing::CancelFlag;

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// What a scripted invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehaviour {
    /// Writes its output and exits with the given code.
    Exit(i32),
    /// Fails to start.
    SpawnError,
    /// Reports a timeout.
    TimeOut,
}

/// A scripted behaviour for invocations matching an asset and/or threshold.
#[derive(Debug, Clone)]
struct MockExpectation {
    asset: Option<String>,
    threshold: Option<u32>,
    behaviour: MockBehaviour,
}

impl MockExpectation {
    fn matches(&self, run: &RunConfiguration) -> bool {
        self.asset.as_deref().is_none_or(|a| a == run.asset.as_str())
            && self.threshold.is_none_or(|t| t == run.threshold)
    }
}

/// One invocation received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub asset: String,
    pub threshold: u32,
    pub events_path: PathBuf,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// Scripted implementation of [`Transcoder`].
///
/// Unscripted invocations succeed. Each invocation appends one line naming
/// its asset and threshold to the run log and writes a small events file to
/// its scratch path.
#[derive(Clone, Default)]
pub struct MockTranscoder {
    expectations: Rc<RefCell<Vec<MockExpectation>>>,
    received_calls: Rc<RefCell<Vec<MockCall>>>,
    running: Rc<Cell<usize>>,
    max_running: Rc<Cell<usize>>,
    cancel_after: Rc<RefCell<Option<(usize, CancelFlag)>>>,
    unavailable: Rc<Cell<bool>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Scripts every invocation of `asset` (any threshold).
    pub fn on_asset(&self, asset: &str, behaviour: MockBehaviour) {
        self.push(Some(asset.to_string()), None, behaviour);
    }

    /// Scripts the invocation of `asset` at `threshold`.
    pub fn on_run(&self, asset: &str, threshold: u32, behaviour: MockBehaviour) {
        self.push(Some(asset.to_string()), Some(threshold), behaviour);
    }

    /// Scripts every invocation.
    pub fn on_every_run(&self, behaviour: MockBehaviour) {
        self.push(None, None, behaviour);
    }

    /// Requests cancellation once `calls` invocations have completed.
    pub fn cancel_after(&self, calls: usize, flag: CancelFlag) {
        *self.cancel_after.borrow_mut() = Some((calls, flag));
    }

    /// Makes `check_available` fail.
    pub fn set_unavailable(&self) {
        self.unavailable.set(true);
    }

    pub fn get_received_calls(&self) -> Vec<MockCall> {
        self.received_calls.borrow().clone()
    }

    /// Largest number of invocations observed running at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_running.get()
    }

    fn push(&self, asset: Option<String>, threshold: Option<u32>, behaviour: MockBehaviour) {
        self.expectations.borrow_mut().push(MockExpectation {
            asset,
            threshold,
            behaviour,
        });
    }

    fn behaviour_for(&self, run: &RunConfiguration) -> MockBehaviour {
        self.expectations
            .borrow()
            .iter()
            .find(|exp| exp.matches(run))
            .map_or(MockBehaviour::Exit(0), |exp| exp.behaviour)
    }

    fn finish_call(&self) {
        self.running.set(self.running.get().saturating_sub(1));

        let completed = self.received_calls.borrow().len();
        if let Some((after, flag)) = self.cancel_after.borrow().as_ref() {
            if completed >= *after {
                flag.cancel();
            }
        }
    }
}

impl Transcoder for MockTranscoder {
    fn check_available(&self) -> CoreResult<()> {
        if self.unavailable.get() {
            return Err(CoreError::DependencyNotFound("mock-transcoder".to_string()));
        }
        Ok(())
    }

    fn run(
        &self,
        run: &RunConfiguration,
        mut log: File,
        timeout: Option<Duration>,
    ) -> CoreResult<RunStatus> {
        let running = self.running.get() + 1;
        self.running.set(running);
        self.max_running.set(self.max_running.get().max(running));

        self.received_calls.borrow_mut().push(MockCall {
            asset: run.asset.as_str().to_string(),
            threshold: run.threshold,
            events_path: run.events_path.clone(),
            args: run
                .to_args()
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            timeout,
        });

        let behaviour = self.behaviour_for(run);
        log::info!(
            "MockTranscoder: {} @ {} -> {:?}",
            run.asset,
            run.threshold,
            behaviour
        );

        let result = match behaviour {
            MockBehaviour::SpawnError => Err(CoreError::CommandStart(
                "mock-transcoder".to_string(),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "scripted spawn error"),
            )),
            MockBehaviour::TimeOut => {
                writeln!(log, "mock transcoder: asset={} threshold={} (hung)", run.asset, run.threshold)?;
                Ok(RunStatus::TimedOut {
                    after: timeout.unwrap_or_default(),
                })
            }
            MockBehaviour::Exit(code) => {
                writeln!(log, "mock transcoder: asset={} threshold={}", run.asset, run.threshold)?;
                std::fs::write(&run.events_path, b"mock events")?;
                Ok(RunStatus::Exited { code: Some(code) })
            }
        };

        self.finish_call();
        result
    }
}
