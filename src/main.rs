use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use advent_runner::client::HttpPuzzleSource;
use advent_runner::config::DEFAULT_BASE_URL;
use advent_runner::session::TerminalPrompt;
use advent_runner::{solutions, Layout, Level, PipelineBuilder, RunOutcome};
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "advent")]
#[command(about = "Fetch, scaffold, test and solve a daily puzzle", long_about = None)]
struct Args {
    /// Puzzle level to work on
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,

    /// Session cookie; takes precedence over the saved one and is not saved
    #[arg(short, long = "session-cookie")]
    session: Option<String>,

    /// Base url of the puzzle pages
    #[arg(long, env = "ADVENT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory holding the session file, cached inputs and solutions
    #[arg(long, env = "ADVENT_ROOT", default_value = env!("CARGO_MANIFEST_DIR"))]
    root: PathBuf,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let level = Level::new(args.level).ok_or_else(|| anyhow!("level must be positive"))?;
    let pipeline = PipelineBuilder::default()
        .layout(Layout::new(args.root))
        .source(Arc::new(HttpPuzzleSource::new(args.base_url)))
        .loader(Arc::new(solutions::registry()))
        .build()?;

    let mut prompt = TerminalPrompt::stdio();
    match pipeline.run(level, args.session, &mut prompt).await? {
        RunOutcome::Solved {
            tests_passed,
            answers,
        } => {
            println!("All {tests_passed} tests passed!");
            println!("{answers}");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::TestsFailed(failure) => {
            eprintln!("Failed test(s): {failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("advent_runner=warn")
        } else {
            EnvFilter::new("advent_runner=info")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
