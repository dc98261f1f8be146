// Port Layer - Interfaces for external dependencies

pub mod document_server;
pub mod process_runner;
pub mod workspace_fs;

// Re-exports
pub use document_server::{DocumentServer, ServerError};
pub use process_runner::{ProcessError, ProcessRunner};
pub use workspace_fs::WorkspaceFs;
