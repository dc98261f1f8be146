// Operator-facing exit statuses (closed set)

/// Process exit status reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    Success,
    Failure,
    ArgumentError,
    ValidationFailure,
    OutOfDate,
    ServerError,
    ConfigError,
    ShutdownRequested,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::ArgumentError => 2,
            ExitStatus::ValidationFailure => 3,
            ExitStatus::OutOfDate => 4,
            ExitStatus::ServerError => 5,
            ExitStatus::ConfigError => 6,
            ExitStatus::ShutdownRequested => 7,
        }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "SUCCESS"),
            ExitStatus::Failure => write!(f, "FAILURE"),
            ExitStatus::ArgumentError => write!(f, "ARGUMENT_ERROR"),
            ExitStatus::ValidationFailure => write!(f, "VALIDATION_FAILURE"),
            ExitStatus::OutOfDate => write!(f, "OUT_OF_DATE"),
            ExitStatus::ServerError => write!(f, "SERVER_ERROR"),
            ExitStatus::ConfigError => write!(f, "CONFIG_ERROR"),
            ExitStatus::ShutdownRequested => write!(f, "SHUTDOWN_REQUESTED"),
        }
    }
}
