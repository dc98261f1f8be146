// Push - upload local changes after checksum reconciliation

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::application::reconcile::ChecksumReconciler;
use crate::domain::{header_token, strip_header, validate_metadata, DocumentId, Phase, SyncState};
use crate::error::{AppError, Result};

/// Result of a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Local copy already matches the server
    Unchanged { id: DocumentId },
    /// Local changes were uploaded and the file re-stamped
    Pushed {
        id: DocumentId,
        path: PathBuf,
        checksum: Option<String>,
    },
}

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
) -> Result<PushOutcome> {
    let text = read_local(ctx, frame, file).await?;
    let metadata = validate_metadata(&text, true).map_err(AppError::Validation)?;
    let id = metadata
        .id
        .ok_or_else(|| AppError::Internal("validated spec has no ID".to_string()))?;

    let reconciliation = ChecksumReconciler::new(ctx.server.clone())
        .reconcile(frame, id, &text)
        .await?;

    if reconciliation.missing_header() {
        warn!(id, file = %file.display(), "Local spec has no checksum header");
        return Err(AppError::MissingChecksum(file.to_path_buf()));
    }

    match reconciliation.state {
        SyncState::UpToDate => {
            info!(id, "Nothing to push");
            return Ok(PushOutcome::Unchanged { id });
        }
        SyncState::ServerModified | SyncState::BothModified => {
            return Err(AppError::OutOfDate(reconciliation.state));
        }
        SyncState::LocalModified => {}
    }

    let canonical = strip_header(&text);
    let updated = frame
        .phase(Phase::ContactServer, async {
            ctx.server.update_text(id, &canonical).await.map_err(AppError::from)
        })
        .await?;

    // The server has already changed: store its reply without a checkpoint
    ctx.fs.publish_atomic(file, &updated).await?;

    let checksum = header_token(&updated).map(str::to_string);
    info!(id, checksum = ?checksum, "Pushed content spec");

    Ok(PushOutcome::Pushed {
        id,
        path: file.to_path_buf(),
        checksum,
    })
}
