// Checksum - show or re-stamp a spec's checksum header

use std::path::Path;

use tracing::info;

use super::{read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::domain::{compute_checksum, header_token, insert_header, strip_header, Phase};
use crate::error::{AppError, Result};

/// Result of a checksum command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumOutcome {
    /// Digest of the canonical content
    pub computed: String,
    /// Header currently in the file
    pub header: Option<String>,
    pub rewritten: bool,
}

impl ChecksumOutcome {
    pub fn matches_header(&self) -> bool {
        self.header.as_deref() == Some(self.computed.as_str())
    }
}

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
    write: bool,
) -> Result<ChecksumOutcome> {
    let text = read_local(ctx, frame, file).await?;
    let canonical = strip_header(&text);
    let computed = compute_checksum(&canonical);
    let header = header_token(&text).map(str::to_string);

    let rewritten = write && header.as_deref() != Some(computed.as_str());
    if rewritten {
        let stamped = insert_header(&canonical, &computed);
        frame
            .phase(Phase::Write, async {
                ctx.fs.publish_atomic(file, &stamped).await.map_err(AppError::from)
            })
            .await?;
        info!(file = %file.display(), checksum = %computed, "Re-stamped checksum header");
    }

    Ok(ChecksumOutcome {
        computed,
        header,
        rewritten,
    })
}
