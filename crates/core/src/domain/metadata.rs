// Content Spec Metadata (minimal validator)
//
// A content spec opens with `Key = Value` lines; the block ends at the first
// blank line. Full structural parsing is delegated to the server.

use std::collections::BTreeMap;

use serde::Serialize;

use super::checksum::CHECKSUM_KEY;
use super::document::DocumentId;

/// Keys that every content spec must declare
pub const REQUIRED_KEYS: [&str; 3] = ["Title", "Product", "Version"];

/// A single validation problem, optionally tied to a 1-based line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub line: Option<usize>,
    pub message: String,
}

impl ValidationIssue {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn general(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Parsed metadata block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecMetadata {
    pub id: Option<DocumentId>,
    /// Keys as written in the file; the first occurrence wins
    pub entries: BTreeMap<String, String>,
}

impl SpecMetadata {
    /// Case-insensitive key lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }
}

/// Parse and validate the metadata block.
///
/// When `require_id` is set, a positive integer `ID` entry is mandatory.
pub fn validate_metadata(
    text: &str,
    require_id: bool,
) -> Result<SpecMetadata, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut metadata = SpecMetadata::default();
    let mut started = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            if started {
                break;
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        started = true;

        let Some((key, value)) = line.split_once('=') else {
            issues.push(ValidationIssue::at(
                line_no,
                format!("expected `Key = Value`, found `{}`", line),
            ));
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key == CHECKSUM_KEY {
            continue;
        }
        if key.is_empty() {
            issues.push(ValidationIssue::at(line_no, "metadata key is empty"));
            continue;
        }
        if value.is_empty() {
            issues.push(ValidationIssue::at(
                line_no,
                format!("metadata `{}` has no value", key),
            ));
            continue;
        }

        if key.eq_ignore_ascii_case("ID") {
            match value.parse::<DocumentId>() {
                Ok(id) if id > 0 => metadata.id = Some(id),
                _ => issues.push(ValidationIssue::at(
                    line_no,
                    format!("ID must be a positive integer, found `{}`", value),
                )),
            }
        }
        metadata
            .entries
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    for required in REQUIRED_KEYS {
        if metadata.get(required).is_none() {
            issues.push(ValidationIssue::general(format!(
                "missing required metadata `{}`",
                required
            )));
        }
    }
    if require_id && metadata.id.is_none() && metadata.get("ID").is_none() {
        issues.push(ValidationIssue::general(
            "missing `ID`; create the spec on the server first",
        ));
    }

    if issues.is_empty() {
        Ok(metadata)
    } else {
        Err(issues)
    }
}
