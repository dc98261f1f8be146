// Command Execution Frame
//
// Interleaves slow operations with cancellation checkpoints. Checkpoints only
// sit where aborting is safe: before network calls, before file writes, before
// spawning a child, and after a child's exit code has been interpreted.

use std::future::Future;

use tracing::{debug, info};

use crate::domain::{CancellationToken, ExternalCommand, Phase, ProcessEnd, ProcessResult};
use crate::error::{AppError, Result};
use crate::port::ProcessRunner;

/// Per-command control flow with a scoped cancellation token
pub struct CommandFrame {
    command: &'static str,
    token: CancellationToken,
}

impl CommandFrame {
    pub fn new(command: &'static str, token: CancellationToken) -> Self {
        Self { command, token }
    }

    pub fn command(&self) -> &'static str {
        self.command
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Continue if running, unwind with `ShutdownRequested` otherwise
    pub fn checkpoint(&self, phase: Phase) -> Result<()> {
        if self.token.is_cancelled() {
            info!(command = self.command, phase = %phase, "Shutdown requested, aborting command");
            return Err(AppError::ShutdownRequested { phase });
        }
        Ok(())
    }

    /// Checkpoint, then drive one phase of work to completion
    pub async fn phase<T, F>(&self, phase: Phase, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.checkpoint(phase)?;
        debug!(command = self.command, phase = %phase, "Entering phase");
        let result = work.await;
        debug!(
            command = self.command,
            phase = %phase,
            ok = result.is_ok(),
            "Leaving phase"
        );
        result
    }

    /// Run an external tool under this frame's cancellation scope
    ///
    /// The exit code is interpreted first; the trailing checkpoint then takes
    /// precedence, so a tool killed by the operator's interrupt reports a
    /// shutdown rather than a tool failure.
    pub async fn run_process(
        &self,
        runner: &dyn ProcessRunner,
        command: ExternalCommand,
    ) -> Result<ProcessResult> {
        self.checkpoint(Phase::SpawnProcess)?;

        let tool = command.program().to_string();
        let result = runner.run(command, &self.token).await?;

        let outcome = match result.end {
            ProcessEnd::Cancelled => Err(AppError::ShutdownRequested {
                phase: Phase::SpawnProcess,
            }),
            _ if result.success() => Ok(result),
            _ => Err(AppError::ProcessFailed {
                tool,
                exit_code: result.exit_code,
            }),
        };

        self.checkpoint(Phase::AfterProcess)?;
        outcome
    }
}
