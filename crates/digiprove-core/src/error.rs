//! Error types for the Digiprove protocol layer

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol-layer error types
///
/// All of these are reported synchronously, before any network activity.
#[derive(Debug, Error)]
pub enum Error {
    /// User id missing from credentials
    #[error("user id not supplied")]
    MissingUserId,

    /// Neither a password nor an API key is available
    #[error("no api key or password")]
    MissingAuthSecret,

    /// API key supplied without the domain it was issued for
    #[error("domain name not supplied")]
    MissingDomain,

    /// Password shorter than the service minimum
    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    /// Content was empty after trimming and no files were supplied
    #[error("no content supplied")]
    EmptyContent,

    /// A required field is missing from caller-supplied input
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A metadata or document-tracking key is not a safe XML element name
    #[error("invalid element name: {0}")]
    InvalidElementName(String),

    /// A content file could not be read (aborts the whole operation)
    #[error("error reading {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// Structured content could not be serialized to its archival text form
    #[error("content serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
