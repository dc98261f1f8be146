// Document Domain Model

use serde::{Deserialize, Serialize};

/// Server-side content specification ID
pub type DocumentId = u64;

/// Summary entity returned by the server for a content specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: DocumentId,
    #[serde(default)]
    pub revision: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "lastModified")]
    pub last_modified: Option<String>,
}
