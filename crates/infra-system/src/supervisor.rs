// Process Supervisor - runs external authoring tools (ADR-002)
// reason: tokio::process for async child management, nix for process-group signals
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use cspress_core::application::constants::GRACEFUL_TERMINATION_TIMEOUT;
use cspress_core::domain::{CancellationToken, ExternalCommand, ProcessEnd, ProcessResult};
use cspress_core::port::{ProcessError, ProcessRunner};

use crate::console::{Console, ConsoleStream};
use crate::relay::{RelaySink, StreamRelay};

/// Produces the input relayed into an interactive child's stdin
pub type InputFactory = Arc<dyn Fn() -> Box<dyn AsyncRead + Send + Unpin> + Send + Sync>;

/// Variables never inherited by children; they confuse the publishing toolchain
const ENV_DENYLIST: &[&str] = &["XML_CATALOG_FILES"];

/// Supervised child process runner
///
/// Each run spawns the command line through the platform shell, relays its
/// streams on dedicated tasks and returns only after every output relay has
/// drained. Cancellation and deadlines terminate the whole process group:
/// SIGTERM first, SIGKILL after the grace period.
pub struct ProcessSupervisor {
    console: Console,
    input: InputFactory,
    graceful_timeout: Duration,
    env_denylist: Vec<String>,
}

impl ProcessSupervisor {
    /// Create a supervisor relaying to `console` and reading from the process stdin
    pub fn new(console: Console) -> Self {
        Self {
            console,
            input: Arc::new(|| Box::new(tokio::io::stdin()) as Box<dyn AsyncRead + Send + Unpin>),
            graceful_timeout: GRACEFUL_TERMINATION_TIMEOUT,
            env_denylist: ENV_DENYLIST.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the stdin source for interactive commands
    pub fn with_input<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn AsyncRead + Send + Unpin> + Send + Sync + 'static,
    {
        self.input = Arc::new(factory);
        self
    }

    pub fn with_graceful_timeout(mut self, graceful_timeout: Duration) -> Self {
        self.graceful_timeout = graceful_timeout;
        self
    }

    fn build_command(&self, command: &ExternalCommand) -> Command {
        #[cfg(unix)]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&command.command_line);
            // Own process group, so termination reaches the tool's children too
            cmd.process_group(0);
            cmd
        };

        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&command.command_line);
            cmd
        };

        cmd.current_dir(&command.working_dir);
        for key in &self.env_denylist {
            cmd.env_remove(key);
        }
        cmd.envs(&command.env_overrides);

        cmd.stdin(if command.allow_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(if command.display_output {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        // Always piped: hidden stderr still goes to the debug log
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Terminate the child's process group and reap it
    ///
    /// Returns the exit code if the child exited normally in the grace period.
    async fn terminate(&self, child: &mut Child) -> Option<i32> {
        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                use nix::sys::signal::{killpg, Signal};
                use nix::unistd::Pid;

                let group = Pid::from_raw(pid as i32);

                // Step 1: SIGTERM for graceful shutdown
                info!(pid = %pid, "Sending SIGTERM to process group");
                if let Err(e) = killpg(group, Signal::SIGTERM) {
                    debug!(pid = %pid, error = %e, "SIGTERM failed");
                }

                // Step 2: wait out the grace period
                match timeout(self.graceful_timeout, child.wait()).await {
                    Ok(Ok(status)) => {
                        info!(pid = %pid, "Process exited after SIGTERM");
                        return status.code();
                    }
                    Ok(Err(e)) => warn!(pid = %pid, error = %e, "Wait after SIGTERM failed"),
                    Err(_) => {
                        warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                        if let Err(e) = killpg(group, Signal::SIGKILL) {
                            debug!(pid = %pid, error = %e, "SIGKILL failed");
                        }
                    }
                }
            }
        }

        // Windows, or the group kill did not reap the child
        if let Err(e) = child.kill().await {
            debug!(error = %e, "Child kill failed");
        }
        match child.wait().await {
            Ok(status) => status.code(),
            Err(_) => None,
        }
    }

    /// Signal what is left of an exited child's process group, then stop the relays
    async fn terminate_leftovers(
        &self,
        pid: Option<u32>,
        stdout: &mut Option<StreamRelay>,
        stderr: &mut Option<StreamRelay>,
    ) {
        #[cfg(unix)]
        {
            if let Some(pid) = pid {
                use nix::sys::signal::{killpg, Signal};
                use nix::unistd::Pid;

                let group = Pid::from_raw(pid as i32);
                info!(pid = %pid, "Sending SIGTERM to leftover process group");
                if let Err(e) = killpg(group, Signal::SIGTERM) {
                    debug!(pid = %pid, error = %e, "SIGTERM failed");
                }
                if timeout(self.graceful_timeout, join_outputs(stdout, stderr))
                    .await
                    .is_err()
                {
                    warn!(pid = %pid, "Output still held after SIGTERM, sending SIGKILL");
                    if let Err(e) = killpg(group, Signal::SIGKILL) {
                        debug!(pid = %pid, error = %e, "SIGKILL failed");
                    }
                }
            }
        }
        #[cfg(not(unix))]
        let _ = pid;

        for relay in [&*stdout, &*stderr].into_iter().flatten() {
            relay.stop();
        }
    }
}

#[async_trait]
impl ProcessRunner for ProcessSupervisor {
    async fn run(
        &self,
        command: ExternalCommand,
        cancel: &CancellationToken,
    ) -> Result<ProcessResult, ProcessError> {
        check_work_dir(&command.working_dir).await?;

        if cancel.is_cancelled() {
            debug!(command = %command.program(), "Cancelled before spawn");
            return Ok(ProcessResult::terminated(ProcessEnd::Cancelled, None));
        }

        let mut child = self
            .build_command(&command)
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed {
                command: command.program().to_string(),
                message: e.to_string(),
            })?;

        info!(
            command = %command.program(),
            pid = ?child.id(),
            working_dir = %command.working_dir.display(),
            "Spawned external tool"
        );

        let pid = child.id();
        let deadline = command.deadline.map(|limit| Instant::now() + limit);

        let mut stdout_relay = child.stdout.take().map(|stdout| {
            StreamRelay::spawn(
                "stdout",
                stdout,
                RelaySink::console(self.console.clone(), ConsoleStream::Stdout),
            )
        });
        let mut stderr_relay = child.stderr.take().map(|stderr| {
            let sink = if command.display_output {
                RelaySink::console(self.console.clone(), ConsoleStream::Stderr)
            } else {
                RelaySink::log(format!("{} stderr", command.program()))
            };
            StreamRelay::spawn("stderr", stderr, sink)
        });
        let mut stdin_relay = child
            .stdin
            .take()
            .map(|stdin| StreamRelay::spawn("stdin", (self.input)(), RelaySink::writer(stdin, true)));

        let interrupted = tokio::select! {
            status = child.wait() => Ok(status),
            _ = cancel.cancelled() => Err(ProcessEnd::Cancelled),
            _ = sleep_until_deadline(deadline) => Err(ProcessEnd::DeadlineExceeded),
        };

        let mut result = match interrupted {
            Ok(Ok(status)) => ProcessResult::exited(status.code()),
            Ok(Err(e)) => {
                warn!(command = %command.program(), error = %e, "Waiting on child failed");
                ProcessResult::unknown()
            }
            Err(end) => {
                warn!(command = %command.program(), end = ?end, "Terminating external tool");
                let exit_code = self.terminate(&mut child).await;
                // Leftover grandchildren may still hold the pipes open
                for relay in [&stdout_relay, &stderr_relay].into_iter().flatten() {
                    relay.stop();
                }
                ProcessResult::terminated(end, exit_code)
            }
        };

        if let Some(relay) = stdin_relay.as_mut() {
            relay.stop();
            relay.join().await;
        }

        if matches!(result.end, ProcessEnd::Exited | ProcessEnd::WaitFailed) {
            // The shell is gone but background children may still hold its
            // output pipes; keep honouring cancellation and the deadline.
            let drained = tokio::select! {
                biased;
                _ = join_outputs(&mut stdout_relay, &mut stderr_relay) => None,
                _ = cancel.cancelled() => Some(ProcessEnd::Cancelled),
                _ = sleep_until_deadline(deadline) => Some(ProcessEnd::DeadlineExceeded),
            };
            if let Some(end) = drained {
                warn!(
                    command = %command.program(),
                    end = ?end,
                    "Terminating processes still holding tool output"
                );
                self.terminate_leftovers(pid, &mut stdout_relay, &mut stderr_relay)
                    .await;
                result = ProcessResult::terminated(end, result.exit_code);
            }
        }
        join_outputs(&mut stdout_relay, &mut stderr_relay).await;

        info!(
            command = %command.program(),
            exit_code = ?result.exit_code,
            end = ?result.end,
            "External tool finished"
        );

        Ok(result)
    }
}

async fn check_work_dir(path: &Path) -> Result<(), ProcessError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(ProcessError::WorkDirMissing(path.to_path_buf())),
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Wait for both output relays; cancel-safe
async fn join_outputs(stdout: &mut Option<StreamRelay>, stderr: &mut Option<StreamRelay>) {
    if let Some(relay) = stdout.as_mut() {
        relay.join().await;
    }
    if let Some(relay) = stderr.as_mut() {
        relay.join().await;
    }
}
