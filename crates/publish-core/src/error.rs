//! Error types and the user-facing error taxonomy

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::outcome::Step;

/// Result type for publish-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in publish-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Folder missing, not a directory, or without a usable name
    #[error("Invalid folder {path}: {reason}")]
    InvalidFolder { path: PathBuf, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Exec(#[from] publish_exec::Error),

    #[error(transparent)]
    Git(#[from] publish_git::Error),

    #[error(transparent)]
    Github(#[from] publish_github::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ToolMissing,
    ExecutionFailed,
    StatusUnavailable,
    AuthRequired,
    NameConflict,
    RemoteConflict,
    MergeConflict,
    IdentityRequired,
    NetworkError,
    Timeout,
    ProviderError,
    InvalidFolder,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToolMissing => "ToolMissing",
            Self::ExecutionFailed => "ExecutionFailed",
            Self::StatusUnavailable => "StatusUnavailable",
            Self::AuthRequired => "AuthRequired",
            Self::NameConflict => "NameConflict",
            Self::RemoteConflict => "RemoteConflict",
            Self::MergeConflict => "MergeConflict",
            Self::IdentityRequired => "IdentityRequired",
            Self::NetworkError => "NetworkError",
            Self::Timeout => "Timeout",
            Self::ProviderError => "ProviderError",
            Self::InvalidFolder => "InvalidFolder",
        }
    }

    /// The user can fix this by changing input or environment and retrying.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            Self::ToolMissing
                | Self::AuthRequired
                | Self::NameConflict
                | Self::RemoteConflict
                | Self::MergeConflict
                | Self::IdentityRequired
                | Self::NetworkError
                | Self::Timeout
                | Self::InvalidFolder
        )
    }

    /// Process exit code for a command-line front end: 1 for recoverable
    /// errors, 2 for everything else.
    pub fn exit_code(self) -> i32 {
        if self.is_recoverable() { 1 } else { 2 }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn exec_kind(err: &publish_exec::Error) -> ErrorKind {
    use publish_exec::Error as E;
    match err {
        E::ToolMissing { .. } => ErrorKind::ToolMissing,
        E::InvalidWorkingDir { .. } => ErrorKind::InvalidFolder,
        E::Spawn { .. } => ErrorKind::ExecutionFailed,
        E::Timeout { .. } => ErrorKind::Timeout,
    }
}

fn git_kind(err: &publish_git::Error) -> ErrorKind {
    use publish_git::Error as E;
    match err {
        E::Exec(e) => exec_kind(e),
        E::StatusUnavailable { .. } => ErrorKind::StatusUnavailable,
        E::CommandFailed { .. } | E::Rejected { .. } | E::DetachedHead => ErrorKind::ExecutionFailed,
        E::MergeConflict { .. } => ErrorKind::MergeConflict,
        E::AuthRequired { .. } => ErrorKind::AuthRequired,
        E::Network { .. } => ErrorKind::NetworkError,
        E::IdentityRequired { .. } => ErrorKind::IdentityRequired,
    }
}

fn github_kind(err: &publish_github::Error) -> ErrorKind {
    use publish_github::Error as E;
    match err {
        E::Exec(e) => exec_kind(e),
        E::Git(e) => git_kind(e),
        E::NameConflict { .. } => ErrorKind::NameConflict,
        E::AuthRequired { .. } => ErrorKind::AuthRequired,
        E::Network { .. } => ErrorKind::NetworkError,
        E::Provider { .. } => ErrorKind::ProviderError,
        E::RemoteConflict { .. } => ErrorKind::RemoteConflict,
    }
}

impl Error {
    /// Most specific taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFolder { .. } => ErrorKind::InvalidFolder,
            Self::Config { .. } | Self::Io(_) => ErrorKind::ExecutionFailed,
            Self::Exec(e) => exec_kind(e),
            Self::Git(e) => git_kind(e),
            Self::Github(e) => github_kind(e),
        }
    }

    /// What the caller should change before retrying, for user-actionable
    /// errors.
    pub fn hint(&self) -> Option<String> {
        use publish_github::Error as Gh;

        match self {
            Self::Exec(publish_exec::Error::ToolMissing { program })
            | Self::Git(publish_git::Error::Exec(publish_exec::Error::ToolMissing { program }))
            | Self::Github(Gh::Exec(publish_exec::Error::ToolMissing { program })) => {
                return Some(format!("Install '{program}' and make sure it is on PATH"));
            }
            Self::Github(Gh::NameConflict { name }) => {
                return Some(format!(
                    "The name '{name}' is taken; supply a different repository name and retry"
                ));
            }
            Self::Github(Gh::RemoteConflict { name, .. }) => {
                return Some(format!(
                    "Remove or rename the existing '{name}' remote, or publish to the repository it already points at"
                ));
            }
            Self::Git(publish_git::Error::Rejected { .. }) => {
                return Some(
                    "The remote has commits you do not have; pull them (`git pull`) or enable \
                     fetch_before_push, then run again"
                        .into(),
                );
            }
            Self::Git(publish_git::Error::DetachedHead) => {
                return Some("Check out a branch and retry".into());
            }
            _ => {}
        }

        let hint = match self.kind() {
            ErrorKind::AuthRequired => {
                "Supply a GitHub access token or run `gh auth login`, then retry"
            }
            ErrorKind::MergeConflict => {
                "Resolve the conflicting paths, commit the merge, then run again"
            }
            ErrorKind::IdentityRequired => {
                "Supply an author name and email, or set git user.name and user.email"
            }
            ErrorKind::NetworkError => "Check the network connection and retry",
            ErrorKind::Timeout => {
                "The remote did not answer in time; retry or raise network_timeout_secs"
            }
            ErrorKind::InvalidFolder => "Pass the path of an existing directory",
            _ => return None,
        };
        Some(hint.to_string())
    }
}

/// Serializable error report placed in a [`crate::SetupOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    /// Step that failed; `None` when the failure happened while checking
    /// preconditions or inspecting status
    pub step: Option<Step>,
    pub message: String,
    pub hint: Option<String>,
}

impl ErrorDetail {
    pub fn new(error: &Error, step: Option<Step>) -> Self {
        Self {
            kind: error.kind(),
            step,
            message: error.to_string(),
            hint: error.hint(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind.is_recoverable()
    }
}
