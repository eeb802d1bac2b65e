use std::fmt;

use tracing::info;

use crate::config::{Level, RunContext};
use crate::error::{Error, Result};
use crate::registry::{Answer, SolverModule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub level: Level,
    pub part_one: Answer,
    pub part_two: Answer,
}

impl fmt::Display for Answers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Your answers to level {} are {} and {}",
            self.level, self.part_one, self.part_two
        )
    }
}

/// Runs both parts against the real input, part one first. Answers are not
/// checked.
pub async fn execute(ctx: &RunContext, solver: &dyn SolverModule, input: &str) -> Result<Answers> {
    let part_one = solver.solve_part_one(input).await.map_err(Error::Solver)?;
    info!(level = %ctx.level, answer = %part_one, "part one solved");
    let part_two = solver.solve_part_two(input).await.map_err(Error::Solver)?;
    info!(level = %ctx.level, answer = %part_two, "part two solved");

    Ok(Answers {
        level: ctx.level,
        part_one,
        part_two,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::Session;

    struct Lengths;

    #[async_trait]
    impl SolverModule for Lengths {
        async fn solve_part_one(&self, input: &str) -> anyhow::Result<Answer> {
            Ok(input.len().into())
        }

        async fn solve_part_two(&self, input: &str) -> anyhow::Result<Answer> {
            tokio::task::yield_now().await;
            Ok(input.to_uppercase().into())
        }
    }

    struct Broken;

    #[async_trait]
    impl SolverModule for Broken {
        async fn solve_part_one(&self, _input: &str) -> anyhow::Result<Answer> {
            anyhow::bail!("bad input")
        }

        async fn solve_part_two(&self, _input: &str) -> anyhow::Result<Answer> {
            unreachable!("part two must not run after part one failed")
        }
    }

    fn ctx() -> RunContext {
        RunContext::new(Level::new(6).unwrap(), Session::new("abc"))
    }

    #[tokio::test]
    async fn execute_should_label_answers_with_level() {
        let answers = execute(&ctx(), &Lengths, "abc").await.unwrap();

        assert_eq!(answers.to_string(), "Your answers to level 6 are 3 and ABC");
    }

    #[tokio::test]
    async fn solver_error_should_propagate() {
        let err = execute(&ctx(), &Broken, "abc").await.unwrap_err();

        assert!(matches!(err, Error::Solver(_)));
        assert_eq!(err.to_string(), "solver failed: bad input");
    }
}
