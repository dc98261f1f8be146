//! REST adapter setup errors

use thiserror::Error;

/// Errors raised while constructing a `RestDocumentServer`
///
/// Request-time failures are reported through the core `ServerError`.
#[derive(Error, Debug)]
pub enum RestSetupError {
    #[error("Invalid server URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
