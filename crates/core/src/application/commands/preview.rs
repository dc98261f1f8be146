// Preview - open a built bundle with the configured viewer

use std::path::{Path, PathBuf};

use super::{bundle_dir, expand_path, parent_dir, CommandContext};
use crate::application::frame::CommandFrame;
use crate::domain::{ExternalCommand, Phase};
use crate::error::{AppError, Result};

pub async fn execute(ctx: &CommandContext, frame: &CommandFrame, file: &Path) -> Result<PathBuf> {
    frame.checkpoint(Phase::Parse)?;
    let bundle = bundle_dir(&ctx.settings, file);
    if !ctx.fs.is_dir(&bundle).await {
        return Err(AppError::Config(format!(
            "no bundle found at {}; run assemble first",
            bundle.display()
        )));
    }

    let command = ExternalCommand::new(expand_path(&ctx.settings.preview_command, &bundle), parent_dir(file))
        .display_output(true)
        .deadline(ctx.settings.process_timeout);
    frame.run_process(ctx.runner.as_ref(), command).await?;

    Ok(bundle)
}
