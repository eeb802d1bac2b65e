//! Run-wide settings and the on-disk layout of a puzzle workspace.

use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://adventofcode.com/2016/day";

/// Name of the file the session cookie is persisted to, relative to the root.
pub const SESSION_FILE: &str = "SESSION_COOKIE";

pub const INPUTS_DIR: &str = "inputs";

pub const SOLUTIONS_DIR: &str = "src/solutions";

pub const README_FILE: &str = "README.md";

pub const TESTS_FILE: &str = "tests.rs";

pub const DAY_MODULE_FILE: &str = "mod.rs";

/// Present in a description once the second half of the puzzle is unlocked.
pub const PART_TWO_MARKER: &str = "Part Two";

/// A puzzle number. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    pub fn new(level: u32) -> Option<Self> {
        (level > 0).then_some(Self(level))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Module name of the level's solution directory, e.g. `day_07`.
    pub fn module_name(self) -> String {
        format!("day_{:02}", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The opaque session cookie value. Kept out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(<redacted>)")
    }
}

/// Immutable per-run values handed to every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub level: Level,
    pub session: Session,
}

impl RunContext {
    pub fn new(level: Level, session: Session) -> Self {
        Self { level, session }
    }
}

/// Where the tool keeps its state: credential, input cache and solutions.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_file(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    pub fn input_file(&self, session: &Session, level: Level) -> PathBuf {
        self.root
            .join(INPUTS_DIR)
            .join(session.as_str())
            .join(level.to_string())
    }

    pub fn solutions_dir(&self) -> PathBuf {
        self.root.join(SOLUTIONS_DIR)
    }

    pub fn solutions_index(&self) -> PathBuf {
        self.solutions_dir().join("mod.rs")
    }

    pub fn day_dir(&self, level: Level) -> PathBuf {
        self.solutions_dir().join(level.module_name())
    }

    /// Paths of the part 1 and part 2 solver files.
    pub fn solver_files(&self, level: Level) -> [PathBuf; 2] {
        let dir = self.day_dir(level);
        [dir.join("part_1.rs"), dir.join("part_2.rs")]
    }

    pub fn readme_file(&self, level: Level) -> PathBuf {
        self.day_dir(level).join(README_FILE)
    }

    pub fn tests_file(&self, level: Level) -> PathBuf {
        self.day_dir(level).join(TESTS_FILE)
    }

    pub fn day_module_file(&self, level: Level) -> PathBuf {
        self.day_dir(level).join(DAY_MODULE_FILE)
    }
}
