// cspress Infrastructure - System Adapters
// Implements: ProcessRunner, WorkspaceFs (ADR-002)

pub mod console;
pub mod fs;
pub mod relay;
pub mod supervisor;

pub use console::{Console, ConsoleStream};
pub use fs::LocalWorkspaceFs;
pub use relay::{RelaySink, SharedBuffer, StreamRelay};
pub use supervisor::ProcessSupervisor;
