//! Publishing a folder whose remote has moved on
//!
//! Each test publishes a repository to a bare remote, then advances the
//! remote from a second clone before running the engine again.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use publish_core::{
    CancelToken, ErrorKind, PublishConfig, PublishEngine, PullPolicy, RepoSetupRequest, SetupOutcome,
    Step,
};
use publish_test_utils::git::{
    bare_remote, clone_into, commit_count, commit_file, configure_identity, git,
    real_git_repo_with_commit, test_identity,
};
use publish_test_utils::{LocalProvisioner, RecordingRunner, TestProject};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A published project plus a second clone of the same remote.
struct Diverged {
    project: TestProject,
    remote: PathBuf,
    other: PathBuf,
}

impl Diverged {
    /// Project with `README.md`, `a.txt` and `b.txt`, pushed to a bare
    /// remote.
    fn new() -> Self {
        let project = TestProject::new();
        real_git_repo_with_commit(project.path());
        commit_file(project.path(), "a.txt", "a\n", "Add a");
        commit_file(project.path(), "b.txt", "b\n", "Add b");

        let remote = project.remote_path("shared");
        bare_remote(&remote);
        let remote_url = remote.to_string_lossy().into_owned();
        git(project.path(), &["remote", "add", "origin", &remote_url]);
        git(project.path(), &["push", "--set-upstream", "origin", "main"]);

        let other = project.root().join("other");
        clone_into(&remote, &other);

        Self {
            project,
            remote,
            other,
        }
    }

    /// Commit `file` in the second clone and push it.
    fn advance_remote(&self, file: &str, content: &str) {
        commit_file(&self.other, file, content, "Remote change");
        git(&self.other, &["push", "origin", "main"]);
    }

    fn run(&self, runner: &RecordingRunner, config: PublishConfig) -> SetupOutcome {
        let provisioner = LocalProvisioner::new(self.project.remotes());
        let request = RepoSetupRequest::new(self.project.path()).with_identity(test_identity());
        PublishEngine::new(runner, &provisioner, config).run(&request, &CancelToken::new())
    }
}

/// A committed project whose `origin` was attached by hand to a remote that
/// already holds unrelated history on `main`, with no upstream set.
fn attached_to_hosted_remote(hosted_file: &str, content: &str) -> (TestProject, PathBuf) {
    let project = TestProject::new();
    real_git_repo_with_commit(project.path());

    let remote = project.remote_path("hosted");
    bare_remote(&remote);
    let remote_url = remote.to_string_lossy().into_owned();

    let seed = project.root().join("seed");
    std::fs::create_dir_all(&seed).unwrap();
    git(&seed, &["init"]);
    git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(&seed);
    commit_file(&seed, hosted_file, content, "Initial commit from host");
    git(&seed, &["push", &remote_url, "main"]);

    git(project.path(), &["remote", "add", "origin", &remote_url]);
    (project, remote)
}

fn publish(project: &TestProject, runner: &RecordingRunner) -> SetupOutcome {
    let provisioner = LocalProvisioner::new(project.remotes());
    let request = RepoSetupRequest::new(project.path()).with_identity(test_identity());
    PublishEngine::new(runner, &provisioner, PublishConfig::default()).run(&request, &CancelToken::new())
}

// =============================================================================
// Behind the remote
// =============================================================================

#[test]
fn test_modified_files_with_remote_one_ahead() {
    let repo = Diverged::new();
    repo.advance_remote("other.txt", "other\n");
    repo.project.write("a.txt", "a changed\n");
    repo.project.write("b.txt", "b changed\n");
    git(repo.project.path(), &["fetch", "origin"]);
    let runner = RecordingRunner::default();

    let outcome = repo.run(&runner, PublishConfig::default());

    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert_eq!(
        outcome.mutating_steps(),
        vec![Step::Stage, Step::Commit, Step::Pull, Step::Push]
    );
    let status = &outcome.final_status;
    assert_eq!((status.ahead, status.behind), (0, 0));
    assert!(status.is_clean());
    // 3 published + 1 remote + local commit + merge commit
    assert_eq!(commit_count(&repo.remote, "main"), 6);
}

#[test]
fn test_engine_fetches_before_deciding() {
    let repo = Diverged::new();
    repo.advance_remote("other.txt", "other\n");
    let runner = RecordingRunner::default();

    let outcome = repo.run(&runner, PublishConfig::default());

    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert_eq!(outcome.steps[0].step, Step::Fetch);
    assert_eq!(outcome.mutating_steps(), vec![Step::Pull]);
    assert!(repo.project.path().join("other.txt").exists());
    assert_eq!(runner.count("push"), 0);
}

#[test]
fn test_without_fetch_stale_refs_are_trusted() {
    let repo = Diverged::new();
    repo.advance_remote("other.txt", "other\n");
    let runner = RecordingRunner::default();
    let config = PublishConfig {
        fetch_before_push: false,
        ..PublishConfig::default()
    };

    let outcome = repo.run(&runner, config);

    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert!(outcome.steps.is_empty());
    assert_eq!(runner.count("fetch"), 0);
}

#[test]
fn test_attached_remote_with_existing_history_is_merged() {
    let (project, remote) = attached_to_hosted_remote("LICENSE", "MIT\n");
    let runner = RecordingRunner::default();

    let outcome = publish(&project, &runner);

    assert!(outcome.is_success(), "{:?} after {:?}", outcome.error, outcome.steps);
    assert_eq!(outcome.steps[0].step, Step::Fetch);
    assert!(outcome.steps[0].message.contains("tracking 'origin/main'"));
    assert_eq!(outcome.mutating_steps(), vec![Step::Pull, Step::Push]);
    let status = &outcome.final_status;
    assert_eq!(status.upstream.as_deref(), Some("origin/main"));
    assert_eq!((status.ahead, status.behind), (0, 0));
    project.assert_file_exists("LICENSE");
    let tracked = runner.invocations().into_iter().any(|inv| {
        inv.subcommand_is("branch") && inv.to_string().contains("--set-upstream-to=origin/main")
    });
    assert!(tracked);
    // local commit + hosted commit + merge commit
    assert_eq!(commit_count(&remote, "main"), 3);

    let again = publish(&project, &RecordingRunner::default());
    assert!(again.is_success(), "{:?}", again.error);
    assert_eq!(again.mutating_steps(), Vec::<Step>::new());
}

#[test]
fn test_attached_remote_with_conflicting_history_reports_conflict() {
    let (project, remote) = attached_to_hosted_remote("README.md", "# Hosted\n");
    let runner = RecordingRunner::default();

    let outcome = publish(&project, &runner);

    let error = outcome.error.clone().expect("expected MergeConflict");
    assert_eq!(error.kind, ErrorKind::MergeConflict);
    assert_eq!(error.step, Some(Step::Pull));
    assert_eq!(outcome.final_status.conflicted, vec!["README.md".to_string()]);
    assert_eq!(runner.count("push"), 0);
    assert_eq!(commit_count(&remote, "main"), 1);
}

// =============================================================================
// Conflicts
// =============================================================================

#[test]
fn test_conflicting_pull_halts_after_commit() {
    let repo = Diverged::new();
    repo.advance_remote("a.txt", "remote version\n");
    repo.project.write("a.txt", "local version\n");
    repo.project.write("b.txt", "b changed\n");
    let runner = RecordingRunner::default();

    let outcome = repo.run(&runner, PublishConfig::default());

    let error = outcome.error.clone().expect("expected MergeConflict");
    assert_eq!(error.kind, ErrorKind::MergeConflict);
    assert_eq!(error.step, Some(Step::Pull));
    assert!(error.message.contains("a.txt"));
    assert!(error.hint.is_some());
    assert_eq!(
        outcome.mutating_steps(),
        vec![Step::Stage, Step::Commit, Step::Pull]
    );
    let commit = outcome.steps.iter().find(|r| r.step == Step::Commit).unwrap();
    assert!(commit.success);
    assert_eq!(outcome.final_status.conflicted, vec!["a.txt".to_string()]);
    assert_eq!(runner.count("push"), 0);
    assert_eq!(commit_count(&repo.remote, "main"), 4);
}

#[test]
fn test_unresolved_conflict_blocks_next_run() {
    let repo = Diverged::new();
    repo.advance_remote("a.txt", "remote version\n");
    repo.project.write("a.txt", "local version\n");
    repo.run(&RecordingRunner::default(), PublishConfig::default());

    let runner = RecordingRunner::default();
    let outcome = repo.run(&runner, PublishConfig::default());

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::MergeConflict);
    assert_eq!(error.step, None);
    assert!(outcome.steps.is_empty());
    assert_eq!(runner.count("add"), 0);
}

#[test]
fn test_fast_forward_only_refuses_diverged_history() {
    let repo = Diverged::new();
    repo.advance_remote("other.txt", "other\n");
    repo.project.write("a.txt", "a changed\n");
    let runner = RecordingRunner::default();
    let config = PublishConfig {
        pull_policy: PullPolicy::FastForwardOnly,
        ..PublishConfig::default()
    };

    let outcome = repo.run(&runner, config);

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ExecutionFailed);
    assert_eq!(error.step, Some(Step::Pull));
    assert!(outcome.final_status.conflicted.is_empty());
    assert_eq!(runner.count("push"), 0);
}
