use tokio::fs;
use tracing::info;

use crate::client::PuzzleSource;
use crate::config::{Layout, RunContext};
use crate::error::{Error, Result};

/// Returns the puzzle input for the run, downloading it only if it is not
/// cached yet. Cached inputs are never refreshed.
pub async fn fetch(ctx: &RunContext, layout: &Layout, source: &dyn PuzzleSource) -> Result<String> {
    let path = layout.input_file(&ctx.session, ctx.level);
    if fs::try_exists(&path).await.map_err(Error::cache(&path))? {
        info!(level = %ctx.level, "using cached input");
        return fs::read_to_string(&path).await.map_err(Error::cache(&path));
    }

    let body = source.input(ctx.level, &ctx.session).await?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(Error::cache(parent))?;
    }
    fs::write(&path, &body).await.map_err(Error::cache(&path))?;
    info!(level = %ctx.level, bytes = body.len(), "input downloaded");
    Ok(body)
}
