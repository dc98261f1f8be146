// Checksum Reconciler
// Compares a local spec file against the server copy via checksum headers

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{header_token, ChecksumTriple, DocumentId, Phase, SyncState};
use crate::error::Result;
use crate::port::DocumentServer;

use super::frame::CommandFrame;

/// Result of reconciling one local file with the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub id: DocumentId,
    pub triple: ChecksumTriple,
    pub state: SyncState,
}

impl Reconciliation {
    /// The file was never synced (no base marker to compare against)
    pub fn missing_header(&self) -> bool {
        !self.triple.has_header()
    }
}

/// Checksum Reconciler
pub struct ChecksumReconciler {
    server: Arc<dyn DocumentServer>,
}

impl ChecksumReconciler {
    pub fn new(server: Arc<dyn DocumentServer>) -> Self {
        Self { server }
    }

    /// Checksum the server reports for a document (empty if the server copy has no header)
    pub async fn server_checksum(&self, id: DocumentId) -> Result<String> {
        let text = self.server.get_text(id).await?;
        Ok(header_token(&text).unwrap_or_default().to_string())
    }

    /// Classify `local_text` against the server copy of document `id`
    pub async fn reconcile(
        &self,
        frame: &CommandFrame,
        id: DocumentId,
        local_text: &str,
    ) -> Result<Reconciliation> {
        let server = frame
            .phase(Phase::ContactServer, self.server_checksum(id))
            .await?;

        let triple = ChecksumTriple::from_local_text(local_text, server);
        let state = triple.classify();

        debug!(
            id,
            header = %triple.header,
            computed_local = %triple.computed_local,
            server = %triple.server,
            "Checksum triple"
        );
        info!(id, state = %state, "Reconciled local copy with server");

        Ok(Reconciliation { id, triple, state })
    }
}
