// Assemble - lay out a bundle directory and run the external builder

use std::path::{Path, PathBuf};

use tracing::info;

use super::{bundle_dir, read_local, shell_quote, CommandContext};
use crate::application::constants::{SPEC_FILE_ENV, SPEC_PLACEHOLDER};
use crate::application::frame::CommandFrame;
use crate::domain::{validate_metadata, ExternalCommand, Phase};
use crate::error::{AppError, Result};

/// Result of an assemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOutcome {
    pub bundle_dir: PathBuf,
    /// False when the build step was skipped
    pub built: bool,
}

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
    build: bool,
) -> Result<AssembleOutcome> {
    let text = read_local(ctx, frame, file).await?;
    validate_metadata(&text, false).map_err(AppError::Validation)?;

    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Argument(format!("{} is not a file", file.display())))?;
    let bundle = bundle_dir(&ctx.settings, file);

    // The old bundle is removed as a whole; no checkpoint between delete and recreate.
    frame.checkpoint(Phase::Write)?;
    ctx.fs.remove_dir_all(&bundle).await?;
    ctx.fs.create_dir_all(&bundle).await?;

    frame
        .phase(Phase::Write, async {
            ctx.fs.publish_atomic(&bundle.join(&file_name), &text).await.map_err(AppError::from)
        })
        .await?;

    if !build {
        info!(bundle = %bundle.display(), "Bundle assembled, build skipped");
        return Ok(AssembleOutcome {
            bundle_dir: bundle,
            built: false,
        });
    }

    let command_line = ctx
        .settings
        .build_command
        .replace(SPEC_PLACEHOLDER, &shell_quote(&file_name));
    let command = ExternalCommand::new(command_line, &bundle)
        .env(SPEC_FILE_ENV, &file_name)
        .display_output(true)
        .deadline(ctx.settings.process_timeout);

    frame.run_process(ctx.runner.as_ref(), command).await?;
    info!(bundle = %bundle.display(), "Bundle built");

    Ok(AssembleOutcome {
        bundle_dir: bundle,
        built: true,
    })
}
