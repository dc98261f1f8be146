// Document Server Port
// Abstraction over the REST service that stores content specs

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{DocumentId, DocumentInfo};

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Content spec {0} does not exist on the server")]
    NotFound(DocumentId),

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to reach the server: {0}")]
    Transport(String),

    #[error("Failed to decode server response: {0}")]
    Decode(String),
}

/// Document server trait
///
/// Implementations:
/// - RestDocumentServer: HTTP client (infra-rest)
/// - MockDocumentServer: mockall-generated, behind the `test-mocks` feature
#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
#[async_trait]
pub trait DocumentServer: Send + Sync {
    /// Fetch the content spec text, including its `CHECKSUM=` header
    async fn get_text(&self, id: DocumentId) -> Result<String, ServerError>;

    /// Fetch summary information for a content spec
    async fn get_info(&self, id: DocumentId) -> Result<DocumentInfo, ServerError>;

    /// Replace the content spec text, returning the server's new text
    ///
    /// # Errors
    /// - ServerError::Rejected if the server refuses the content
    async fn update_text(&self, id: DocumentId, text: &str) -> Result<String, ServerError>;

    /// Create a new content spec, returning the server's text (with its new ID)
    async fn create_text(&self, text: &str) -> Result<String, ServerError>;
}
