// External Command Domain Model

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// An external tool invocation, consumed by a single supervised run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Shell command line
    pub command_line: String,
    /// Must exist and be a directory before the run starts
    pub working_dir: PathBuf,
    pub env_overrides: BTreeMap<String, String>,
    /// Pipe the supervisor's own input into the child's stdin
    pub allow_stdin: bool,
    /// Relay child stdout/stderr to the console live
    pub display_output: bool,
    /// Terminate the child if it runs longer than this
    pub deadline: Option<Duration>,
}

impl ExternalCommand {
    pub fn new(command_line: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: working_dir.into(),
            env_overrides: BTreeMap::new(),
            allow_stdin: false,
            display_output: false,
            deadline: None,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overrides.insert(key.into(), value.into());
        self
    }

    pub fn allow_stdin(mut self, allow: bool) -> Self {
        self.allow_stdin = allow;
        self
    }

    pub fn display_output(mut self, display: bool) -> Self {
        self.display_output = display;
        self
    }

    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// First word of the command line, used in logs and error messages
    pub fn program(&self) -> &str {
        self.command_line
            .split_whitespace()
            .next()
            .unwrap_or(self.command_line.as_str())
    }
}

/// How a supervised run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessEnd {
    /// Child exited on its own (exit code may still be absent if killed by a signal)
    Exited,
    /// Waiting on the child failed; the exit code is unknown
    WaitFailed,
    /// Deadline expired and the child was terminated
    DeadlineExceeded,
    /// Cancellation was requested and the child was terminated
    Cancelled,
}

/// Outcome of one supervised run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    /// `None` means unknown, never success
    pub exit_code: Option<i32>,
    pub end: ProcessEnd,
}

impl ProcessResult {
    pub fn exited(code: Option<i32>) -> Self {
        Self {
            exit_code: code,
            end: ProcessEnd::Exited,
        }
    }

    pub fn unknown() -> Self {
        Self {
            exit_code: None,
            end: ProcessEnd::WaitFailed,
        }
    }

    pub fn terminated(end: ProcessEnd, exit_code: Option<i32>) -> Self {
        Self { exit_code, end }
    }

    pub fn success(&self) -> bool {
        self.end == ProcessEnd::Exited && self.exit_code == Some(0)
    }
}
