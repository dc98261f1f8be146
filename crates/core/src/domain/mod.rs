// Domain Layer - Pure business logic and entities

pub mod cancellation;
pub mod checksum;
pub mod command;
pub mod document;
pub mod exit_status;
pub mod metadata;
pub mod phase;

// Re-exports
pub use cancellation::{cancellation_channel, CancellationSource, CancellationState, CancellationToken};
pub use checksum::{
    classify, compute_checksum, header_token, insert_header, strip_header, ChecksumTriple,
    SyncState, CHECKSUM_KEY,
};
pub use command::{ExternalCommand, ProcessEnd, ProcessResult};
pub use document::{DocumentId, DocumentInfo};
pub use exit_status::ExitStatus;
pub use metadata::{validate_metadata, SpecMetadata, ValidationIssue};
pub use phase::Phase;
