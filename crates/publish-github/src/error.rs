//! Error types for publish-github

/// Result type for publish-github operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while provisioning or attaching a remote
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Exec(#[from] publish_exec::Error),

    #[error(transparent)]
    Git(#[from] publish_git::Error),

    /// A repository with this name already exists under the owner
    #[error("A repository named '{name}' already exists on this account")]
    NameConflict { name: String },

    /// The provider CLI has no usable credential
    #[error("GitHub authentication required: {message}")]
    AuthRequired { message: String },

    /// The provider could not be reached
    #[error("Network error talking to GitHub: {message}")]
    Network { message: String },

    /// Unexpected provider response, reported verbatim
    #[error("GitHub CLI error: {message}")]
    Provider { message: String },

    /// The canonical remote already points somewhere else
    #[error("Remote '{name}' already points at {existing}, not {requested}")]
    RemoteConflict {
        name: String,
        existing: String,
        requested: String,
    },
}

impl Error {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}
