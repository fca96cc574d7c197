//! Error types for publish-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from publish-core
    #[error(transparent)]
    Core(#[from] publish_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Command-line parsing stopped; also carries `--help` and `--version`
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The command already printed its failure; only the exit code remains
    #[error("exit code {code}")]
    Reported { code: i32 },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// 1 for errors the user can fix, 2 for internal failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => e.kind().exit_code(),
            // Help and version requests print to stdout
            Self::Usage(e) if !e.use_stderr() => 0,
            Self::Usage(_) => 1,
            Self::Reported { code } => *code,
            Self::User { .. } => 1,
            Self::Io(_) | Self::Json(_) => 2,
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Core(e) => e.hint(),
            _ => None,
        }
    }
}
