// Central Error Type for the Application

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{ExitStatus, Phase, SyncState, ValidationIssue};
use crate::port::{ProcessError, ServerError};

/// Application-level error type
///
/// Every variant maps onto exactly one operator-facing [`ExitStatus`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed:\n{}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("{}", .0.message())]
    OutOfDate(SyncState),

    #[error("{} has no CHECKSUM header. Pull the spec from the server before pushing.", .0.display())]
    MissingChecksum(PathBuf),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Shutdown requested during {phase}")]
    ShutdownRequested { phase: Phase },

    #[error("{tool} failed with {}", describe_exit(.exit_code))]
    ProcessFailed {
        tool: String,
        exit_code: Option<i32>,
    },

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Operator-facing exit status for this error
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            AppError::Validation(_) => ExitStatus::ValidationFailure,
            AppError::OutOfDate(_) | AppError::MissingChecksum(_) => ExitStatus::OutOfDate,
            AppError::Server(_) => ExitStatus::ServerError,
            AppError::Config(_) => ExitStatus::ConfigError,
            AppError::Argument(_) => ExitStatus::ArgumentError,
            AppError::ShutdownRequested { .. } => ExitStatus::ShutdownRequested,
            AppError::ProcessFailed { .. }
            | AppError::Process(_)
            | AppError::Io(_)
            | AppError::Internal(_) => ExitStatus::Failure,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, AppError::ShutdownRequested { .. })
    }
}

impl From<&AppError> for ExitStatus {
    fn from(err: &AppError) -> Self {
        err.exit_status()
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "an unknown exit status".to_string(),
    }
}
