// Pull - download a content spec into a local file

use std::path::PathBuf;

use tracing::info;

use super::CommandContext;
use crate::application::constants::PULLED_SPEC_SUFFIX;
use crate::application::frame::CommandFrame;
use crate::domain::{header_token, DocumentId, Phase};
use crate::error::{AppError, Result};

/// Result of a pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub id: DocumentId,
    pub path: PathBuf,
    /// Checksum header carried by the server text, if any
    pub checksum: Option<String>,
}

/// Default local file name for a pulled spec
pub fn default_path(id: DocumentId) -> PathBuf {
    PathBuf::from(format!("{}{}", id, PULLED_SPEC_SUFFIX))
}

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    id: DocumentId,
    output: Option<PathBuf>,
) -> Result<PullOutcome> {
    let text = frame
        .phase(Phase::ContactServer, async {
            ctx.server.get_text(id).await.map_err(AppError::from)
        })
        .await?;

    let path = output.unwrap_or_else(|| default_path(id));
    frame
        .phase(Phase::Write, async {
            ctx.fs.publish_atomic(&path, &text).await.map_err(AppError::from)
        })
        .await?;

    let checksum = header_token(&text).map(str::to_string);
    info!(id, path = %path.display(), checksum = ?checksum, "Pulled content spec");

    Ok(PullOutcome { id, path, checksum })
}
