// Validate - check a local spec's metadata block

use std::path::Path;

use tracing::info;

use super::{read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::domain::{validate_metadata, Phase, SpecMetadata};
use crate::error::{AppError, Result};

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
) -> Result<SpecMetadata> {
    let text = read_local(ctx, frame, file).await?;
    frame.checkpoint(Phase::Transform)?;

    let metadata = validate_metadata(&text, false).map_err(AppError::Validation)?;
    info!(file = %file.display(), title = ?metadata.title(), "Content spec is valid");
    Ok(metadata)
}
