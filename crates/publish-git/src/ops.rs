//! Git working-copy operations driven through the `git` binary
//!
//! [`Git`] binds a runner, the git program name and a folder. Each method is
//! one git subcommand with its exit code mapped to a typed error.

use std::fmt;
use std::path::PathBuf;

use publish_exec::{CommandOutput, CommandRunner, Invocation};
use serde::{Deserialize, Serialize};

use crate::classify::{Failure, classify};
use crate::porcelain;
use crate::status::{CommitSummary, LAST_COMMIT_FORMAT, RepositoryStatus};
use crate::{Error, Result};

/// Version-control metadata entry checked before running git
const METADATA_DIR: &str = ".git";

/// Author identity injected into commits for this invocation only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// git bound to one folder.
pub struct Git<'r, R: CommandRunner + ?Sized> {
    runner: &'r R,
    program: String,
    dir: PathBuf,
    identity: Option<Identity>,
}

impl<'r, R: CommandRunner + ?Sized> Git<'r, R> {
    pub fn new(runner: &'r R, program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
            dir: dir.into(),
            identity: None,
        }
    }

    /// Use `identity` for commits and merge commits. It is passed as `-c`
    /// overrides and never written to git config.
    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// `true` if the folder itself carries version-control metadata.
    ///
    /// A folder nested inside another repository without its own `.git` is
    /// not considered version-controlled.
    pub fn has_metadata(&self) -> bool {
        self.dir.join(METADATA_DIR).exists()
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        let mut inv = Invocation::new(self.program.as_str(), self.dir.as_path());
        if let Some(identity) = &self.identity {
            inv = inv
                .arg("-c")
                .arg(format!("user.name={}", identity.name))
                .arg("-c")
                .arg(format!("user.email={}", identity.email));
        }
        inv.args(args.iter().copied())
    }

    fn network_invocation(&self, args: &[&str]) -> Invocation {
        self.invocation(args)
            .network()
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
    }

    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        Ok(self.runner.run(invocation)?)
    }

    fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = self.run(invocation)?;
        if output.success() {
            Ok(output)
        } else {
            Err(command_failed(invocation, &output))
        }
    }

    /// Inspect the folder and build a fresh [`RepositoryStatus`].
    ///
    /// # Arguments
    ///
    /// * `remote_name` - Remote whose URL is reported as the canonical remote
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exec`] if git cannot be run and
    /// [`Error::StatusUnavailable`] if any query fails or prints output the
    /// parsers do not recognize. A partial status is never returned.
    pub fn inspect(&self, remote_name: &str) -> Result<RepositoryStatus> {
        if !self.has_metadata() {
            tracing::debug!(dir = %self.dir.display(), "No version-control metadata");
            return Ok(RepositoryStatus::not_version_controlled());
        }

        let output = self.run(&self.invocation(&[
            "status",
            "--porcelain=v2",
            "--branch",
            "--untracked-files=all",
            "-z",
        ]))?;
        if !output.success() {
            return Err(Error::status_unavailable(output.diagnostic()));
        }
        let parsed = porcelain::parse(&output.stdout)?;

        let remote_url = self.remote_url(remote_name).map_err(|e| match e {
            Error::CommandFailed { stderr, .. } => Error::status_unavailable(stderr),
            other => other,
        })?;

        let branch = if parsed.has_commits { parsed.head } else { None };
        let last_commit = if parsed.has_commits {
            Some(self.last_commit()?)
        } else {
            None
        };

        Ok(RepositoryStatus {
            is_version_controlled: true,
            branch,
            has_commits: parsed.has_commits,
            remote_url,
            upstream: parsed.upstream,
            ahead: parsed.ahead,
            behind: parsed.behind,
            staged: parsed.staged,
            modified: parsed.modified,
            untracked: parsed.untracked,
            conflicted: parsed.conflicted,
            last_commit,
        })
    }

    fn last_commit(&self) -> Result<CommitSummary> {
        let output = self.run(&self.invocation(&["log", "-1", LAST_COMMIT_FORMAT]))?;
        if !output.success() {
            return Err(Error::status_unavailable(output.diagnostic()));
        }
        CommitSummary::parse(&output.stdout)
    }

    /// URL configured for `remote`, or `None` if the remote does not exist.
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let key = format!("remote.{remote}.url");
        let inv = self.invocation(&["config", "--get", &key]);
        let output = self.run(&inv)?;
        match output.exit_code {
            0 => Ok(Some(output.stdout.trim().to_string())),
            // git config exits 1 when the key is absent
            1 if output.stderr.trim().is_empty() => Ok(None),
            _ => Err(command_failed(&inv, &output)),
        }
    }

    /// `git init` followed by pointing HEAD at `default_branch`.
    pub fn init(&self, default_branch: &str) -> Result<()> {
        self.run_checked(&self.invocation(&["init"]))?;
        let head_ref = format!("refs/heads/{default_branch}");
        self.run_checked(&self.invocation(&["symbolic-ref", "HEAD", &head_ref]))?;
        tracing::info!(dir = %self.dir.display(), branch = default_branch, "Initialized repository");
        Ok(())
    }

    /// Stage every change under the folder, including deletions.
    pub fn stage_all(&self) -> Result<()> {
        self.run_checked(&self.invocation(&["add", "--all", "--", "."]))?;
        Ok(())
    }

    /// Commit the index. `allow_empty` permits a commit with no changes,
    /// used to give an empty folder its first commit.
    pub fn commit(&self, message: &str, allow_empty: bool) -> Result<()> {
        let mut args = vec!["commit", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        let inv = self.invocation(&args);
        let output = self.run(&inv)?;
        if output.success() {
            return Ok(());
        }

        let text = output.combined().to_lowercase();
        if text.contains("please tell me who you are")
            || text.contains("empty ident")
            || text.contains("unable to auto-detect email")
            || text.contains("auto-detection is disabled")
        {
            return Err(Error::IdentityRequired {
                message: output.diagnostic(),
            });
        }
        Err(command_failed(&inv, &output))
    }

    /// Abbreviated hash of HEAD.
    pub fn head_short(&self) -> Result<String> {
        let output = self.run_checked(&self.invocation(&["rev-parse", "--short", "HEAD"]))?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.run_checked(&self.invocation(&["remote", "add", name, url]))?;
        Ok(())
    }

    /// Refresh remote-tracking refs. Does not touch the working tree.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        let inv = self.network_invocation(&["fetch", remote]);
        let output = self.run(&inv)?;
        if output.success() {
            Ok(())
        } else {
            Err(remote_failure(&inv, &output))
        }
    }

    /// Track `<remote>/<branch>` from `branch` if that remote-tracking ref
    /// exists. Returns `false` when the remote has no such branch.
    pub fn track_remote_branch(&self, remote: &str, branch: &str) -> Result<bool> {
        let tracking = format!("refs/remotes/{remote}/{branch}");
        let inv = self.invocation(&["rev-parse", "--verify", "--quiet", &tracking]);
        let output = self.run(&inv)?;
        match output.exit_code {
            0 => {}
            1 => return Ok(false),
            _ => return Err(command_failed(&inv, &output)),
        }

        let upstream = format!("--set-upstream-to={remote}/{branch}");
        self.run_checked(&self.invocation(&["branch", &upstream, branch]))?;
        tracing::info!(remote, branch, "Tracking existing remote branch");
        Ok(true)
    }

    /// Pull `branch` from `remote`, merging or fast-forwarding only.
    ///
    /// A merge pull accepts unrelated histories, so a remote created with
    /// its own initial commit can be merged.
    ///
    /// Conflicts are reported as [`Error::MergeConflict`] and the merge is
    /// left in progress for the user to resolve.
    pub fn pull(&self, remote: &str, branch: &str, ff_only: bool) -> Result<()> {
        // Explicit modes so user pull.rebase / pull.ff settings do not apply
        let mode: &[&str] = if ff_only {
            &["--ff-only"]
        } else {
            &["--no-rebase", "--ff", "--allow-unrelated-histories"]
        };
        let mut args = vec!["pull"];
        args.extend_from_slice(mode);
        args.extend(["--no-edit", remote, branch]);
        let inv = self.network_invocation(&args);
        let output = self.run(&inv)?;
        if output.success() {
            return Ok(());
        }

        let paths = self.conflicted_paths()?;
        if !paths.is_empty() {
            tracing::warn!(?paths, "Pull stopped with conflicts");
            return Err(Error::MergeConflict { paths });
        }
        Err(remote_failure(&inv, &output))
    }

    /// Paths left unmerged by a merge in progress.
    pub fn conflicted_paths(&self) -> Result<Vec<String>> {
        let output = self.run_checked(&self.invocation(&[
            "diff",
            "--name-only",
            "--diff-filter=U",
            "-z",
        ]))?;
        Ok(output
            .stdout
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Push `branch` to `remote`, recording it as upstream when asked.
    pub fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.extend([remote, branch]);
        let inv = self.network_invocation(&args);
        let output = self.run(&inv)?;
        if output.success() {
            return Ok(());
        }

        let text = output.combined();
        if text.contains("[rejected]") || text.contains("non-fast-forward") || text.contains("fetch first") {
            return Err(Error::Rejected {
                remote: remote.to_string(),
                message: output.diagnostic(),
            });
        }
        Err(remote_failure(&inv, &output))
    }
}

fn command_failed(invocation: &Invocation, output: &CommandOutput) -> Error {
    Error::CommandFailed {
        command: invocation.to_string(),
        code: output.exit_code,
        stderr: output.diagnostic(),
    }
}

fn remote_failure(invocation: &Invocation, output: &CommandOutput) -> Error {
    let message = output.diagnostic();
    match classify(&output.combined()) {
        Failure::Auth => Error::AuthRequired { message },
        Failure::Network => Error::Network { message },
        Failure::Other => command_failed(invocation, output),
    }
}
