//! Reconciliation engine
//!
//! The engine never trusts an in-memory view of the folder. Every decision
//! is made on a [`RepositoryStatus`] read immediately before it, so a run
//! against an already published, clean folder performs no mutating step.
//!
//! Order of checks:
//!
//! | State        | Condition                                | Action                       |
//! |--------------|------------------------------------------|------------------------------|
//! | NotVersioned | no `.git` in the folder                  | init on the default branch   |
//! | Uncommitted  | unstaged changes                         | stage everything             |
//! |              | staged changes, or no commits yet        | commit                       |
//! | NoRemote     | canonical remote missing                 | create remote, attach it     |
//! | Stale        | `fetch_before_push`, remote not new      | fetch, track remote branch   |
//! | Diverged     | `behind > 0`                             | pull                         |
//! | ReadyToPush  | no upstream yet, or `ahead > 0`          | push (setting upstream)      |
//!
//! Pull and push happen only when the request asks to push.

use std::path::{Path, PathBuf};

use publish_exec::{CommandRunner, ProcessRunner};
use publish_git::{Git, RepositoryStatus};
use publish_github::{
    GhProvisioner, RemoteProvisioner, RemoteSpec, attach_remote, repository_name_for,
    sanitize_repository_name,
};

use crate::cancel::CancelToken;
use crate::config::{PublishConfig, PullPolicy};
use crate::error::ErrorDetail;
use crate::outcome::{OutcomeRecorder, SetupOutcome, Step};
use crate::request::RepoSetupRequest;
use crate::{Error, Result};

/// Run the workflow with the real `git` and `gh` binaries.
pub fn run_setup_workflow(request: &RepoSetupRequest, config: PublishConfig) -> SetupOutcome {
    let runner = ProcessRunner::new(config.network_timeout());
    let provisioner = GhProvisioner::new(runner.clone(), config.gh_program.clone());
    PublishEngine::new(runner, provisioner, config).run(request, &CancelToken::new())
}

/// Validate `folder` and inspect it with the real `git` binary.
pub fn inspect_folder(folder: &Path, config: &PublishConfig) -> Result<RepositoryStatus> {
    let folder = validate_folder(folder)?;
    let runner = ProcessRunner::new(config.network_timeout());
    let git = Git::new(&runner, config.git_program.as_str(), folder);
    Ok(git.inspect(&config.remote_name)?)
}

/// Drives a folder to "committed, attached to a remote and pushed".
pub struct PublishEngine<R, P> {
    runner: R,
    provisioner: P,
    config: PublishConfig,
}

impl<R: CommandRunner, P: RemoteProvisioner> PublishEngine<R, P> {
    pub fn new(runner: R, provisioner: P, config: PublishConfig) -> Self {
        Self {
            runner,
            provisioner,
            config,
        }
    }

    fn git(&self, folder: &Path) -> Git<'_, R> {
        Git::new(&self.runner, self.config.git_program.as_str(), folder)
    }

    /// Run the workflow once.
    ///
    /// # Arguments
    ///
    /// * `request` - Folder and caller intent (visibility, push, identity, token)
    /// * `cancel` - Checked before each step; a step in progress always completes
    ///
    /// # Errors
    ///
    /// None are returned. A failure halts the run at the failing step and is
    /// reported in [`SetupOutcome::error`] with the steps already performed.
    /// An invalid folder is rejected before any command is spawned.
    pub fn run(&self, request: &RepoSetupRequest, cancel: &CancelToken) -> SetupOutcome {
        let recorder = OutcomeRecorder::start();
        tracing::info!(?request, "Starting publish workflow");

        // Checked before any command is spawned.
        let folder = match validate_folder(&request.folder) {
            Ok(folder) => folder,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected folder");
                let detail = ErrorDetail::new(&e, None);
                return recorder.finish(RepositoryStatus::default(), None, Some(detail), false);
            }
        };

        let mut session = Session {
            engine: self,
            request,
            git: self.git(&folder).with_identity(request.identity.clone()),
            folder,
            cancel,
            recorder,
            status: RepositoryStatus::default(),
            created_url: None,
            failed_step: None,
        };

        let halt = session.reconcile().err();
        session.finish(halt)
    }
}

/// Why a run stopped early.
enum Halt {
    Cancelled,
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(err: Error) -> Self {
        Self::Failed(err)
    }
}

impl From<publish_git::Error> for Halt {
    fn from(err: publish_git::Error) -> Self {
        Self::Failed(err.into())
    }
}

/// State of one run.
struct Session<'a, R: CommandRunner, P> {
    engine: &'a PublishEngine<R, P>,
    request: &'a RepoSetupRequest,
    git: Git<'a, R>,
    folder: PathBuf,
    cancel: &'a CancelToken,
    recorder: OutcomeRecorder,
    /// Most recent successful inspection
    status: RepositoryStatus,
    created_url: Option<String>,
    failed_step: Option<Step>,
}

impl<R: CommandRunner, P: RemoteProvisioner> Session<'_, R, P> {
    fn config(&self) -> &PublishConfig {
        &self.engine.config
    }

    fn refresh(&mut self) -> std::result::Result<(), Halt> {
        self.status = self.git.inspect(&self.config().remote_name)?;
        Ok(())
    }

    /// Run `action` as `step` unless the run was cancelled.
    fn step<T>(
        &mut self,
        step: Step,
        action: impl FnOnce(&Self) -> Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> std::result::Result<T, Halt> {
        if self.cancel.is_cancelled() {
            tracing::info!(next = %step, "Cancelled before step");
            return Err(Halt::Cancelled);
        }
        self.perform(step, action, describe)
    }

    /// Run `action` as `step` and record the result.
    fn perform<T>(
        &mut self,
        step: Step,
        action: impl FnOnce(&Self) -> Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> std::result::Result<T, Halt> {
        tracing::info!(step = %step, "Running step");
        match action(&*self) {
            Ok(value) => {
                let message = describe(&value);
                tracing::info!(step = %step, "{message}");
                self.recorder.record(step, true, message);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(step = %step, error = %e, "Step failed");
                self.recorder.record(step, false, e.to_string());
                self.failed_step = Some(step);
                Err(Halt::Failed(e))
            }
        }
    }

    fn reconcile(&mut self) -> std::result::Result<(), Halt> {
        self.refresh()?;

        if !self.status.is_version_controlled {
            let branch = self.config().default_branch.clone();
            self.step(
                Step::Init,
                |s| Ok(s.git.init(&branch)?),
                |_| format!("Initialized repository on branch '{branch}'"),
            )?;
            self.refresh()?;
        }

        if !self.status.conflicted.is_empty() {
            return Err(publish_git::Error::MergeConflict {
                paths: self.status.conflicted.clone(),
            }
            .into());
        }
        if self.status.has_commits && self.status.branch.is_none() {
            return Err(publish_git::Error::DetachedHead.into());
        }

        self.commit_outstanding()?;

        let Some(branch) = self.status.branch.clone() else {
            return Err(publish_git::Error::DetachedHead.into());
        };

        if self.status.remote_url.is_none() {
            self.provision_remote()?;
        }

        if !self.request.should_push {
            tracing::info!("Push not requested; done");
            return Ok(());
        }

        self.sync_and_push(&branch)
    }

    fn commit_outstanding(&mut self) -> std::result::Result<(), Halt> {
        if self.status.has_unstaged_changes() {
            let count = self.status.modified.len() + self.status.untracked.len();
            self.step(
                Step::Stage,
                |s| Ok(s.git.stage_all()?),
                |_| format!("Staged {count} path(s)"),
            )?;
            self.refresh()?;
        }

        if self.status.staged.is_empty() && self.status.has_commits {
            return Ok(());
        }

        let message = self.commit_message();
        let allow_empty = self.status.staged.is_empty();
        self.step(
            Step::Commit,
            |s| {
                s.git.commit(&message, allow_empty)?;
                Ok(s.git.head_short()?)
            },
            |head| format!("Committed {head}: {message}"),
        )?;
        self.refresh()
    }

    fn commit_message(&self) -> String {
        match self.request.commit_message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ if self.status.has_commits => self.config().update_commit_message.clone(),
            _ => self.config().initial_commit_message.clone(),
        }
    }

    fn repository_name(&self) -> Result<String> {
        let invalid = |reason: String| Error::InvalidFolder {
            path: self.folder.clone(),
            reason,
        };
        match &self.request.name {
            Some(raw) => {
                let name = sanitize_repository_name(raw);
                if name.is_empty() {
                    Err(invalid(format!("'{raw}' is not a usable repository name")))
                } else {
                    Ok(name)
                }
            }
            None => repository_name_for(&self.folder)
                .ok_or_else(|| invalid("the folder name yields no usable repository name".into())),
        }
    }

    fn provision_remote(&mut self) -> std::result::Result<(), Halt> {
        let request = self.request;
        let token = request.access_token.as_deref();
        let url = self.step(
            Step::CreateRemote,
            |s| {
                let name = s.repository_name()?;
                let spec = RemoteSpec::new(name, request.visibility)
                    .with_description(request.description.clone());
                let provisioner = &s.engine.provisioner;
                provisioner.ensure_authenticated(&s.folder, token)?;
                let url = provisioner.create_remote(&s.folder, &spec, token)?;
                Ok((spec, url))
            },
            |(spec, url)| format!("Created {} repository '{}' at {url}", spec.visibility, spec.name),
        )?
        .1;
        self.created_url = Some(url.clone());

        // No cancellation point here: a created repository is always attached.
        let remote = self.config().remote_name.clone();
        self.perform(
            Step::AttachRemote,
            |s| Ok(attach_remote(&s.git, &remote, &url)?),
            |_| format!("Attached '{remote}' to {url}"),
        )?;
        self.refresh()
    }

    fn sync_and_push(&mut self, branch: &str) -> std::result::Result<(), Halt> {
        let remote = self.config().remote_name.clone();

        // A remote attached before this run may already hold the branch;
        // track it so divergence is seen before pushing.
        let adopt = self.status.upstream.is_none() && self.created_url.is_none();
        if self.config().fetch_before_push && (self.status.upstream.is_some() || adopt) {
            let tracked = self.step(
                Step::Fetch,
                |s| {
                    s.git.fetch(&remote)?;
                    Ok(adopt && s.git.track_remote_branch(&remote, branch)?)
                },
                |tracked| {
                    if *tracked {
                        format!("Fetched '{remote}'; tracking '{remote}/{branch}'")
                    } else {
                        format!("Fetched '{remote}'")
                    }
                },
            )?;
            tracing::debug!(tracked, "Remote refs refreshed");
            self.refresh()?;
        }

        if self.status.behind > 0 {
            let behind = self.status.behind;
            let ff_only = self.config().pull_policy == PullPolicy::FastForwardOnly;
            self.step(
                Step::Pull,
                |s| Ok(s.git.pull(&remote, branch, ff_only)?),
                |_| format!("Pulled {behind} commit(s) from '{remote}/{branch}'"),
            )?;
            self.refresh()?;
        }

        let set_upstream = self.status.upstream.is_none();
        if set_upstream || self.status.ahead > 0 {
            self.step(
                Step::Push,
                |s| Ok(s.git.push(&remote, branch, set_upstream)?),
                |_| format!("Pushed '{branch}' to '{remote}'"),
            )?;
            self.refresh()?;
        } else {
            tracing::info!(branch, "Remote is up to date; nothing to push");
        }

        Ok(())
    }

    fn finish(mut self, halt: Option<Halt>) -> SetupOutcome {
        let (error, cancelled) = match halt {
            None => (None, false),
            Some(Halt::Cancelled) => (None, true),
            Some(Halt::Failed(e)) => {
                tracing::warn!(error = %e, kind = %e.kind(), "Publish workflow halted");
                (Some(ErrorDetail::new(&e, self.failed_step)), false)
            }
        };

        // A failed step may have changed the folder since the last
        // inspection; keep that inspection if this one fails.
        if error.is_some() || cancelled {
            match self.git.inspect(&self.config().remote_name) {
                Ok(status) => self.status = status,
                Err(e) => {
                    tracing::debug!(error = %e, "Final inspection failed; reporting last known status");
                }
            }
        }

        let remote_url = self.status.remote_url.clone().or(self.created_url);
        tracing::info!(
            steps = self.recorder.steps().len(),
            success = error.is_none() && !cancelled,
            "Publish workflow finished"
        );
        self.recorder.finish(self.status, remote_url, error, cancelled)
    }
}

/// Existing directory, canonicalized.
fn validate_folder(path: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| Error::InvalidFolder {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    if !path.exists() {
        return Err(invalid("path does not exist"));
    }
    if !path.is_dir() {
        return Err(invalid("path is not a directory"));
    }
    dunce::canonicalize(path).map_err(|e| invalid(&e.to_string()))
}
