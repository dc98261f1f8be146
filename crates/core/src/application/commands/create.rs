// Create - register a new content spec on the server

use std::path::{Path, PathBuf};

use tracing::info;

use super::{read_local, CommandContext};
use crate::application::frame::CommandFrame;
use crate::domain::{strip_header, validate_metadata, DocumentId, Phase};
use crate::error::{AppError, Result};

/// Result of a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    /// ID assigned by the server (absent if the reply carried none)
    pub id: Option<DocumentId>,
    pub path: PathBuf,
}

pub async fn execute(
    ctx: &CommandContext,
    frame: &CommandFrame,
    file: &Path,
) -> Result<CreateOutcome> {
    let text = read_local(ctx, frame, file).await?;
    let metadata = validate_metadata(&text, false).map_err(AppError::Validation)?;
    if let Some(id) = metadata.id {
        return Err(AppError::Argument(format!(
            "{} already has ID {}; use push to update it",
            file.display(),
            id
        )));
    }

    let created = frame
        .phase(Phase::ContactServer, async {
            ctx.server.create_text(&strip_header(&text)).await.map_err(AppError::from)
        })
        .await?;

    // The server has already changed: store its reply without a checkpoint
    ctx.fs.publish_atomic(file, &created).await?;

    let id = validate_metadata(&created, false)
        .ok()
        .and_then(|metadata| metadata.id);
    info!(id = ?id, file = %file.display(), "Created content spec");

    Ok(CreateOutcome {
        id,
        path: file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::test_support::context;
    use crate::domain::{cancellation_channel, CancellationToken};
    use crate::port::document_server::MockDocumentServer;
    use crate::port::process_runner::mocks::ScriptedRunner;
    use crate::port::workspace_fs::mocks::InMemoryFs;
    use std::sync::Arc;

    const NEW_SPEC: &str = "Title = New Guide\nProduct = Docs\nVersion = 2\n";

    #[tokio::test]
    async fn test_create_records_server_id() {
        let reply = format!("CHECKSUM=fff\nID = 99\n{}", NEW_SPEC);
        let mut server = MockDocumentServer::new();
        let served = reply.clone();
        server
            .expect_create_text()
            .withf(|text| text.to_string() == NEW_SPEC)
            .times(1)
            .returning(move |_| Ok(served.clone()));
        let fs = Arc::new(InMemoryFs::new().with_file("new.contentspec", NEW_SPEC));
        let ctx = context(server, fs.clone(), Arc::new(ScriptedRunner::new()));
        let frame = CommandFrame::new("create", CancellationToken::never());

        let outcome = execute(&ctx, &frame, Path::new("new.contentspec"))
            .await
            .unwrap();

        assert_eq!(outcome.id, Some(99));
        assert_eq!(fs.file("new.contentspec"), Some(reply));
    }

    #[tokio::test]
    async fn test_create_rejects_existing_id() {
        let mut server = MockDocumentServer::new();
        server.expect_create_text().never();
        let fs = Arc::new(
            InMemoryFs::new().with_file("old.contentspec", format!("ID = 3\n{}", NEW_SPEC)),
        );
        let ctx = context(server, fs, Arc::new(ScriptedRunner::new()));
        let frame = CommandFrame::new("create", CancellationToken::never());

        let err = execute(&ctx, &frame, Path::new("old.contentspec"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Argument(_)));
    }

    #[tokio::test]
    async fn test_interrupt_after_server_create_keeps_assigned_id() {
        let (source, token) = cancellation_channel();
        let reply = format!("CHECKSUM=fff\nID = 99\n{}", NEW_SPEC);
        let served = reply.clone();
        let mut server = MockDocumentServer::new();
        server.expect_create_text().times(1).returning(move |_| {
            // Interrupt lands while the create request is in flight
            source.cancel();
            Ok(served.clone())
        });
        let fs = Arc::new(InMemoryFs::new().with_file("new.contentspec", NEW_SPEC));
        let ctx = context(server, fs.clone(), Arc::new(ScriptedRunner::new()));
        let frame = CommandFrame::new("create", token);

        let outcome = execute(&ctx, &frame, Path::new("new.contentspec"))
            .await
            .unwrap();

        assert_eq!(outcome.id, Some(99));
        assert_eq!(fs.file("new.contentspec"), Some(reply));
    }
}
