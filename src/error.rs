use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Level;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal failures of a run. Failed tests are reported separately, see
/// [`crate::harness::TestFailure`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("session file {} is unusable: {source}", .path.display())]
    CredentialIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read session from the terminal: {0}")]
    Prompt(#[source] io::Error),

    /// The puzzle site answered with a non-success status. Carries the body.
    #[error("{0}")]
    Fetch(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("cached input {} is unusable: {source}", .path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scaffold {}: {source}", .path.display())]
    ScaffoldIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),

    #[error("level {0} is scaffolded but not compiled into this binary yet; rebuild and run again")]
    NotRegistered(Level),

    #[error("solver failed: {0:#}")]
    Solver(#[source] anyhow::Error),
}

impl Error {
    pub(crate) fn scaffold(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::ScaffoldIo { path, source }
    }

    pub(crate) fn cache(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::CacheIo { path, source }
    }
}
