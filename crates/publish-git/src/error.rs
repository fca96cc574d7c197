//! Error types for publish-git

/// Result type for publish-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in publish-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Exec(#[from] publish_exec::Error),

    /// Status could not be determined; nothing partial is returned
    #[error("Repository status unavailable: {message}")]
    StatusUnavailable { message: String },

    /// A git subcommand exited nonzero for a reason with no finer category
    #[error("'{command}' failed (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The remote refused the push because it has commits we do not
    #[error("Push to '{remote}' was rejected: {message}")]
    Rejected { remote: String, message: String },

    /// HEAD does not point at a branch
    #[error("HEAD is detached; check out a branch before publishing")]
    DetachedHead,

    /// A merge stopped with unmerged paths
    #[error("Merge conflict in {} path(s): {}", paths.len(), paths.join(", "))]
    MergeConflict { paths: Vec<String> },

    /// The remote rejected or could not obtain credentials
    #[error("Authentication with the remote failed: {message}")]
    AuthRequired { message: String },

    /// The remote host could not be reached
    #[error("Network error talking to the remote: {message}")]
    Network { message: String },

    /// git refused to commit without an author identity
    #[error("No commit identity is configured: {message}")]
    IdentityRequired { message: String },
}

impl Error {
    pub fn status_unavailable(message: impl Into<String>) -> Self {
        Self::StatusUnavailable {
            message: message.into(),
        }
    }
}
