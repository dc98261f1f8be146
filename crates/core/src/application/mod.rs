// Application Layer - Use Cases and Command Control Flow

pub mod commands;
pub mod constants;
pub mod frame;
pub mod reconcile;

// Re-exports
pub use commands::{CommandContext, ContentSpecService, ToolSettings};
pub use frame::CommandFrame;
pub use reconcile::{ChecksumReconciler, Reconciliation};
