// Checksum Header & Reconciliation Domain
//
// A synced document carries a `CHECKSUM=<token>` line recording the digest of
// its canonical content at the last successful synchronization. Comparing that
// base marker against a fresh local digest and the server's digest yields a
// three-way drift classification.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Case-sensitive header key
pub const CHECKSUM_KEY: &str = "CHECKSUM";

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*CHECKSUM[ \t]*=[ \t]*(\S+)[ \t]*(?:\r?\n)?")
            .expect("checksum header pattern is valid")
    })
}

/// Relationship between a local copy and the server copy of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    UpToDate,
    LocalModified,
    ServerModified,
    BothModified,
}

impl SyncState {
    /// Actionable operator message for this state
    pub fn message(&self) -> &'static str {
        match self {
            SyncState::UpToDate => "The local copy is up to date with the server.",
            SyncState::LocalModified => {
                "The local copy has been modified. Push it to publish the changes."
            }
            SyncState::ServerModified => {
                "The server copy has changed since the last sync. Pull the latest version before pushing."
            }
            SyncState::BothModified => {
                "Both the local and server copies have changed since the last sync. Pull the latest version and merge your changes by hand."
            }
        }
    }

    pub fn is_up_to_date(&self) -> bool {
        matches!(self, SyncState::UpToDate)
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::UpToDate => write!(f, "UP_TO_DATE"),
            SyncState::LocalModified => write!(f, "LOCAL_MODIFIED"),
            SyncState::ServerModified => write!(f, "SERVER_MODIFIED"),
            SyncState::BothModified => write!(f, "BOTH_MODIFIED"),
        }
    }
}

/// Extract the checksum header token. The last header line wins.
pub fn header_token(text: &str) -> Option<&str> {
    header_regex()
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Remove the first checksum header line, yielding the canonical content
pub fn strip_header(text: &str) -> String {
    header_regex().replacen(text, 1, "").into_owned()
}

/// Prepend a checksum header line to content that has none
pub fn insert_header(content: &str, checksum: &str) -> String {
    format!("{}={}\n{}", CHECKSUM_KEY, checksum, content)
}

/// Lowercase hex SHA-256 of the given canonical content
pub fn compute_checksum(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{:x}", digest)
}

/// The three digests compared during one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumTriple {
    /// Base marker parsed from the local file (empty if absent)
    pub header: String,
    /// Digest of the local file's canonical content
    pub computed_local: String,
    /// Digest reported by the server
    pub server: String,
}

impl ChecksumTriple {
    pub fn new(
        header: impl Into<String>,
        computed_local: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            computed_local: computed_local.into(),
            server: server.into(),
        }
    }

    /// Build the triple for a local file's text
    pub fn from_local_text(local_text: &str, server: impl Into<String>) -> Self {
        let header = header_token(local_text).unwrap_or_default().to_string();
        let computed_local = compute_checksum(&strip_header(local_text));
        Self {
            header,
            computed_local,
            server: server.into(),
        }
    }

    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    pub fn classify(&self) -> SyncState {
        let local_changed = self.header != self.computed_local;
        let server_changed = self.header != self.server;

        match (local_changed, server_changed) {
            (false, false) => SyncState::UpToDate,
            (true, true) => SyncState::BothModified,
            (false, true) => SyncState::ServerModified,
            (true, false) => SyncState::LocalModified,
        }
    }
}

/// Classify a local file's text against the server's checksum
pub fn classify(local_text: &str, server_checksum: &str) -> SyncState {
    ChecksumTriple::from_local_text(local_text, server_checksum).classify()
}
