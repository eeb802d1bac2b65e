//! Solver and test suite interfaces, and the compiled registry that maps a
//! level to its scaffolded module under `src/solutions`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::config::Level;
use crate::harness::Thunk;

/// Whatever a solver produced, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer(String);

impl Answer {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! answer_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Answer {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

answer_from!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, &str,
    String,
);

#[async_trait]
pub trait SolverModule: Send + Sync {
    async fn solve_part_one(&self, input: &str) -> anyhow::Result<Answer>;

    async fn solve_part_two(&self, input: &str) -> anyhow::Result<Answer>;
}

pub trait TestSuite: Send + Sync {
    fn part_one_cases(&self) -> Vec<Thunk>;

    fn part_two_cases(&self) -> Vec<Thunk>;
}

pub struct LoadedLevel {
    pub solver: Arc<dyn SolverModule>,
    pub suite: Arc<dyn TestSuite>,
}

/// Resolves a level to its solver and test suite.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, level: Level) -> Option<LoadedLevel>;
}

pub type SolveFn = fn(&str) -> anyhow::Result<Answer>;

/// A solver that produces its answer asynchronously.
pub type AsyncSolveFn = fn(&str) -> BoxFuture<'_, anyhow::Result<Answer>>;

pub type CasesFn = fn() -> Vec<Thunk>;

#[derive(Clone, Copy)]
enum Solve {
    Sync(SolveFn),
    Async(AsyncSolveFn),
}

impl Solve {
    async fn run(self, input: &str) -> anyhow::Result<Answer> {
        match self {
            Self::Sync(solve) => solve(input),
            Self::Async(solve) => solve(input).await,
        }
    }
}

/// The functions exported by one scaffolded `day_NN` module.
#[derive(Clone, Copy)]
pub struct DayEntry {
    part_one: Solve,
    part_two: Solve,
    part_one_cases: CasesFn,
    part_two_cases: CasesFn,
}

impl DayEntry {
    pub fn new(
        part_one: SolveFn,
        part_two: SolveFn,
        part_one_cases: CasesFn,
        part_two_cases: CasesFn,
    ) -> Self {
        Self {
            part_one: Solve::Sync(part_one),
            part_two: Solve::Sync(part_two),
            part_one_cases,
            part_two_cases,
        }
    }

    /// Like [`DayEntry::new`] for solvers returning a boxed future, e.g.
    /// `fn solve(input: &str) -> BoxFuture<'_, anyhow::Result<Answer>>`.
    pub fn new_async(
        part_one: AsyncSolveFn,
        part_two: AsyncSolveFn,
        part_one_cases: CasesFn,
        part_two_cases: CasesFn,
    ) -> Self {
        Self {
            part_one: Solve::Async(part_one),
            part_two: Solve::Async(part_two),
            part_one_cases,
            part_two_cases,
        }
    }
}

#[async_trait]
impl SolverModule for DayEntry {
    async fn solve_part_one(&self, input: &str) -> anyhow::Result<Answer> {
        self.part_one.run(input).await
    }

    async fn solve_part_two(&self, input: &str) -> anyhow::Result<Answer> {
        self.part_two.run(input).await
    }
}

impl TestSuite for DayEntry {
    fn part_one_cases(&self) -> Vec<Thunk> {
        (self.part_one_cases)()
    }

    fn part_two_cases(&self) -> Vec<Thunk> {
        (self.part_two_cases)()
    }
}

#[derive(Default)]
pub struct Registry {
    days: HashMap<u32, (Arc<dyn SolverModule>, Arc<dyn TestSuite>)>,
}

impl Registry {
    pub fn insert(&mut self, level: u32, entry: DayEntry) {
        let entry = Arc::new(entry);
        self.insert_module(level, entry.clone(), entry);
    }

    /// Registers a hand-written solver and suite, for levels that outgrow
    /// the generated `DayEntry`.
    pub fn insert_module(
        &mut self,
        level: u32,
        solver: Arc<dyn SolverModule>,
        suite: Arc<dyn TestSuite>,
    ) {
        self.days.insert(level, (solver, suite));
    }
}

impl ModuleLoader for Registry {
    fn load(&self, level: Level) -> Option<LoadedLevel> {
        let (solver, suite) = self.days.get(&level.get())?;
        Some(LoadedLevel {
            solver: solver.clone(),
            suite: suite.clone(),
        })
    }
}
