use std::sync::Arc;

use derive_builder::Builder;
use tracing::{info, warn};

use crate::client::PuzzleSource;
use crate::config::{Layout, Level, RunContext};
use crate::error::{Error, Result};
use crate::executor::{self, Answers};
use crate::harness::{TestFailure, TestOutcome, TestRunner};
use crate::input;
use crate::registry::ModuleLoader;
use crate::scaffold::Scaffolder;
use crate::session::{self, Prompt};

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum RunOutcome {
    Solved { tests_passed: usize, answers: Answers },
    TestsFailed(TestFailure),
}

/// Resolve session, fetch input, scaffold, test, and solve, in that order.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Pipeline {
    layout: Layout,
    source: Arc<dyn PuzzleSource>,
    loader: Arc<dyn ModuleLoader>,
}

impl Pipeline {
    pub async fn run(
        &self,
        level: Level,
        session: Option<String>,
        prompt: &mut dyn Prompt,
    ) -> Result<RunOutcome> {
        let session = session::resolve(session, &self.layout, prompt)?;
        let ctx = RunContext::new(level, session);

        let input = input::fetch(&ctx, &self.layout, self.source.as_ref()).await?;

        Scaffolder::new(&self.layout, self.source.as_ref())
            .scaffold(&ctx)
            .await?;

        let loaded = self.loader.load(level).ok_or(Error::NotRegistered(level))?;

        let mut runner = TestRunner::new();
        let tests_passed = match runner.run(loaded.suite.as_ref()).await {
            TestOutcome::Passed { count } => count,
            TestOutcome::Failed(failure) => {
                warn!(%level, invoked = failure.invoked, "tests failed, not running solvers");
                return Ok(RunOutcome::TestsFailed(failure));
            }
        };

        let answers = executor::execute(&ctx, loaded.solver.as_ref(), &input).await?;
        info!(%level, "run complete");
        Ok(RunOutcome::Solved {
            tests_passed,
            answers,
        })
    }
}
