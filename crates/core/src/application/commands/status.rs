// Status - report drift between a local spec and the server copy

use std::path::Path;

use super::{read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::application::reconcile::{ChecksumReconciler, Reconciliation};
use crate::domain::validate_metadata;
use crate::error::{AppError, Result};

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
) -> Result<Reconciliation> {
    let text = read_local(ctx, frame, file).await?;
    let metadata = validate_metadata(&text, true).map_err(AppError::Validation)?;
    let id = metadata
        .id
        .ok_or_else(|| AppError::Internal("validated spec has no ID".to_string()))?;

    ChecksumReconciler::new(ctx.server.clone())
        .reconcile(frame, id, &text)
        .await
}
