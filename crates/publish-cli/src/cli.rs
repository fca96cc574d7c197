//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// gh-publish - Turn a local folder into a published GitHub repository
#[derive(Parser, Debug)]
#[command(name = "gh-publish")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file applied over the global one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize, commit, create the GitHub repository and push
    ///
    /// Only the steps the folder still needs are run, so publishing an
    /// already published folder again pushes new commits and nothing else.
    ///
    /// Examples:
    ///   gh-publish publish .                      # Public repository named after the folder
    ///   gh-publish publish ./site --private       # Private repository
    ///   gh-publish publish . --name site-v2       # Retry after a name conflict
    ///   gh-publish publish . --no-push            # Stop after attaching the remote
    Publish(PublishArgs),

    /// Show the folder's version-control status
    Status {
        /// Folder to inspect
        #[arg(default_value = ".")]
        folder: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check that git and the GitHub CLI are installed and authenticated
    Doctor,

    /// Generate shell completion scripts
    ///
    /// Examples:
    ///   gh-publish completions bash > ~/.local/share/bash-completion/completions/gh-publish
    ///   gh-publish completions zsh > ~/.zfunc/_gh-publish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `publish`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PublishArgs {
    /// Folder to publish
    #[arg(default_value = ".")]
    pub folder: PathBuf,

    /// Create a private repository (default is public)
    #[arg(long)]
    pub private: bool,

    /// Repository description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Commit and attach the remote, but do not pull or push
    #[arg(long)]
    pub no_push: bool,

    /// Repository name (defaults to the folder name)
    #[arg(long)]
    pub name: Option<String>,

    /// Commit message for outstanding changes
    #[arg(short, long)]
    pub message: Option<String>,

    /// Commit author name, when git has none configured
    #[arg(long, requires = "author_email")]
    pub author_name: Option<String>,

    /// Commit author email, when git has none configured
    #[arg(long, requires = "author_name")]
    pub author_email: Option<String>,

    /// GitHub token, when the GitHub CLI is not logged in
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
