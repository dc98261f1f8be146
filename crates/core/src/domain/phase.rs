// Command Phases (checkpoint locations)

/// Safe point in a command's control flow where cancellation is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    ContactServer,
    Transform,
    Write,
    SpawnProcess,
    AfterProcess,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "parse"),
            Phase::ContactServer => write!(f, "contact server"),
            Phase::Transform => write!(f, "transform"),
            Phase::Write => write!(f, "write"),
            Phase::SpawnProcess => write!(f, "spawn process"),
            Phase::AfterProcess => write!(f, "after process"),
        }
    }
}
