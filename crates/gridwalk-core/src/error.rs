//! Error types for the workspace.

use thiserror::Error;

/// Workspace-wide error type.
///
/// Ray traversal itself never fails; these errors come from building and
/// parsing the configuration around it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration value violates an invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed textual input
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
