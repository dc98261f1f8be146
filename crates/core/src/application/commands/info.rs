// Info - show server-side details for a content spec

use super::CommandContext;
use crate::application::frame::CommandFrame;
use crate::domain::{DocumentId, DocumentInfo, Phase};
use crate::error::{AppError, Result};

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    id: DocumentId,
) -> Result<DocumentInfo> {
    frame
        .phase(Phase::ContactServer, async {
            ctx.server.get_info(id).await.map_err(AppError::from)
        })
        .await
}
