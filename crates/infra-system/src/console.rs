// Shared console with line-level mutual exclusion
//
// Child stdout/stderr relays and the CLI's own output all go through one
// lock, so concurrent lines are never interleaved mid-line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

enum ConsoleTarget {
    Stdio,
    Captured { stdout: Vec<u8>, stderr: Vec<u8> },
}

/// Handle to the process console (cheap to clone)
#[derive(Clone)]
pub struct Console {
    target: Arc<Mutex<ConsoleTarget>>,
}

impl Console {
    /// Console writing to the real stdout/stderr
    pub fn stdio() -> Self {
        Self {
            target: Arc::new(Mutex::new(ConsoleTarget::Stdio)),
        }
    }

    /// Console capturing everything in memory (tests)
    pub fn captured() -> Self {
        Self {
            target: Arc::new(Mutex::new(ConsoleTarget::Captured {
                stdout: Vec::new(),
                stderr: Vec::new(),
            })),
        }
    }

    /// Write bytes as one unit and flush. Errors are logged, not returned.
    pub fn write(&self, stream: ConsoleStream, bytes: &[u8]) {
        let mut target = match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match &mut *target {
            ConsoleTarget::Stdio => {
                let result = match stream {
                    ConsoleStream::Stdout => write_flush(&mut io::stdout().lock(), bytes),
                    ConsoleStream::Stderr => write_flush(&mut io::stderr().lock(), bytes),
                };
                if let Err(e) = result {
                    warn!(error = %e, stream = ?stream, "Console write failed");
                }
            }
            ConsoleTarget::Captured { stdout, stderr } => match stream {
                ConsoleStream::Stdout => stdout.extend_from_slice(bytes),
                ConsoleStream::Stderr => stderr.extend_from_slice(bytes),
            },
        }
    }

    pub fn println(&self, stream: ConsoleStream, line: &str) {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.write(stream, &bytes);
    }

    /// Captured stdout (empty for a stdio console)
    pub fn captured_stdout(&self) -> String {
        self.captured_stream(ConsoleStream::Stdout)
    }

    /// Captured stderr (empty for a stdio console)
    pub fn captured_stderr(&self) -> String {
        self.captured_stream(ConsoleStream::Stderr)
    }

    fn captured_stream(&self, stream: ConsoleStream) -> String {
        let target = match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match (&*target, stream) {
            (ConsoleTarget::Captured { stdout, .. }, ConsoleStream::Stdout) => {
                String::from_utf8_lossy(stdout).into_owned()
            }
            (ConsoleTarget::Captured { stderr, .. }, ConsoleStream::Stderr) => {
                String::from_utf8_lossy(stderr).into_owned()
            }
            (ConsoleTarget::Stdio, _) => String::new(),
        }
    }
}

fn write_flush(out: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
