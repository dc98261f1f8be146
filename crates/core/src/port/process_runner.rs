// Process Runner Port
// Abstraction for supervising external authoring tools

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{CancellationToken, ExternalCommand, ProcessResult};

/// Errors raised before or while starting a child process
///
/// A non-zero exit code is not an error here; it is reported through
/// `ProcessResult`.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Working directory does not exist or is not a directory: {}", .0.display())]
    WorkDirMissing(PathBuf),

    #[error("Failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// Process runner trait
///
/// Implementations:
/// - ProcessSupervisor: spawns the command and relays its stdio (infra-system)
/// - ScriptedRunner: returns pre-recorded results (tests)
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion
    ///
    /// Returns once the child has exited and every output relay has drained.
    /// Cancelling `cancel` terminates the child and yields `ProcessEnd::Cancelled`.
    ///
    /// # Errors
    /// - ProcessError::WorkDirMissing before anything is spawned
    /// - ProcessError::SpawnFailed if the process cannot be started
    async fn run(
        &self,
        command: ExternalCommand,
        cancel: &CancellationToken,
    ) -> Result<ProcessResult, ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::CancellationSource;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Runner that replays scripted results and records each command
    #[derive(Default)]
    pub struct ScriptedRunner {
        results: Mutex<VecDeque<ProcessResult>>,
        calls: Mutex<Vec<ExternalCommand>>,
        cancel_during_run: Mutex<Option<CancellationSource>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn returning(results: impl IntoIterator<Item = ProcessResult>) -> Self {
            let runner = Self::new();
            runner.results.lock().unwrap().extend(results);
            runner
        }

        /// Cancel the given scope while the next command "runs"
        pub fn cancel_during_run(self, source: CancellationSource) -> Self {
            *self.cancel_during_run.lock().unwrap() = Some(source);
            self
        }

        pub fn calls(&self) -> Vec<ExternalCommand> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(
            &self,
            command: ExternalCommand,
            _cancel: &CancellationToken,
        ) -> Result<ProcessResult, ProcessError> {
            self.calls.lock().unwrap().push(command);

            if let Some(source) = self.cancel_during_run.lock().unwrap().take() {
                source.cancel();
            }

            Ok(self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ProcessResult::exited(Some(0))))
        }
    }
}
