//! Error types for publish-exec

use std::path::PathBuf;
use std::time::Duration;

/// Result type for publish-exec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while spawning a child process
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program could not be located on PATH
    #[error("'{program}' is not installed or not on PATH")]
    ToolMissing { program: String },

    /// The working directory does not exist or is not a directory
    #[error("Working directory {path} does not exist or is not a directory")]
    InvalidWorkingDir { path: PathBuf },

    /// The OS refused to start or wait for the process
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A network-bound command did not finish within its budget
    #[error("'{command}' timed out after {}s ({attempts} attempts)", timeout.as_secs())]
    Timeout {
        command: String,
        timeout: Duration,
        attempts: u32,
    },
}

impl Error {
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
