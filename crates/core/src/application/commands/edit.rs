// Edit - open a spec in an interactive editor, then re-validate it

use std::path::Path;

use super::{expand_path, parent_dir, read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::domain::{validate_metadata, ExternalCommand, Phase, SpecMetadata};
use crate::error::{AppError, Result};

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
) -> Result<SpecMetadata> {
    frame.checkpoint(Phase::Parse)?;
    if !ctx.fs.exists(file).await {
        return Err(AppError::Argument(format!("{} does not exist", file.display())));
    }
    let file_name = file
        .file_name()
        .ok_or_else(|| AppError::Argument(format!("{} is not a file", file.display())))?;

    // Editors are interactive; no deadline applies.
    let command = ExternalCommand::new(
        expand_path(&ctx.settings.editor, Path::new(file_name)),
        parent_dir(file),
    )
    .allow_stdin(true)
    .display_output(true);
    frame.run_process(ctx.runner.as_ref(), command).await?;

    let text = read_local(ctx, frame, file).await?;
    validate_metadata(&text, false).map_err(AppError::Validation)
}
