pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod input;
pub mod markdown;
pub mod pipeline;
pub mod registry;
pub mod scaffold;
pub mod session;
pub mod solutions;

pub use config::{Layout, Level, RunContext, Session};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineBuilder, RunOutcome};
