// cspress Infrastructure - REST Adapter
// Implements: DocumentServer (ADR-002)

pub mod client;
pub mod error;

pub use client::RestDocumentServer;
pub use error::RestSetupError;
