//! Runs a level's generated test cases before its solvers are trusted with the
//! real input.
//!
//! Each part is a batch: every case of the batch is started, then the batch is
//! awaited as a whole. The first failing case ends the run; siblings that are
//! still pending are dropped rather than awaited. Part two never starts before
//! part one has fully passed.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use futures::future::{poll_fn, try_join_all, BoxFuture};
use futures::FutureExt;
use strum::Display;
use tracing::{debug, info};

use crate::registry::TestSuite;

/// A deferred test case. Passing means resolving to `Ok(())`; returning an
/// error or panicking fails it.
pub type Thunk = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

pub fn thunk<F, Fut>(f: F) -> Thunk
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move || f().boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Part {
    #[strum(serialize = "part one")]
    One,
    #[strum(serialize = "part two")]
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunState {
    Idle,
    RunningPartOne,
    RunningPartTwo,
    Passed,
    Failed,
}

/// Why a test run stopped.
#[derive(Debug)]
pub struct TestFailure {
    pub part: Part,
    pub error: anyhow::Error,
    /// Cases started so far, including the whole failing batch.
    pub invoked: usize,
    /// Cases that had already resolved successfully when the failure surfaced.
    pub passed: usize,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed after {} test(s) started, {} passed: {:#}",
            self.part, self.invoked, self.passed, self.error
        )
    }
}

#[derive(Debug)]
pub enum TestOutcome {
    Passed { count: usize },
    Failed(TestFailure),
}

pub struct TestRunner {
    state: RunState,
    invoked: usize,
    passed: Arc<AtomicUsize>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            invoked: 0,
            passed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn invoked(&self) -> usize {
        self.invoked
    }

    pub async fn run(&mut self, suite: &dyn TestSuite) -> TestOutcome {
        for part in [Part::One, Part::Two] {
            let cases = match part {
                Part::One => {
                    self.transition(RunState::RunningPartOne);
                    suite.part_one_cases()
                }
                Part::Two => {
                    self.transition(RunState::RunningPartTwo);
                    suite.part_two_cases()
                }
            };

            if let Err(error) = self.run_batch(cases).await {
                self.transition(RunState::Failed);
                return TestOutcome::Failed(TestFailure {
                    part,
                    error,
                    invoked: self.invoked,
                    passed: self.passed.load(Ordering::SeqCst),
                });
            }
        }

        self.transition(RunState::Passed);
        info!(count = self.invoked, "all tests passed");
        TestOutcome::Passed {
            count: self.invoked,
        }
    }

    async fn run_batch(&mut self, cases: Vec<Thunk>) -> anyhow::Result<()> {
        install_panic_filter();
        let mut pending = Vec::with_capacity(cases.len());
        for case in cases {
            self.invoked += 1;
            let future =
                silenced(|| panic::catch_unwind(AssertUnwindSafe(case))).map_err(panic_error)?;
            let passed = Arc::clone(&self.passed);
            pending.push(async move {
                let mut guarded = Box::pin(AssertUnwindSafe(future).catch_unwind());
                match poll_fn(|cx| silenced(|| guarded.as_mut().poll(cx))).await {
                    Ok(Ok(())) => {
                        passed.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                    Ok(Err(e)) => Err(e),
                    Err(payload) => Err(panic_error(payload)),
                }
            });
        }

        try_join_all(pending).await.map(|_| ())
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "test runner");
        self.state = next;
    }
}

thread_local! {
    static SILENCED: Cell<bool> = const { Cell::new(false) };
}

/// Wraps the panic hook once so panics caught from test cases are reported
/// through [`TestFailure`] only.
fn install_panic_filter() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !SILENCED.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Runs `f` with the panic hook muted on this thread. `f` must not unwind.
fn silenced<R>(f: impl FnOnce() -> R) -> R {
    let previous = SILENCED.with(|s| s.replace(true));
    let result = f();
    SILENCED.with(|s| s.set(previous));
    result
}

fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("test panicked: {message}")
}
