//! End-to-end publish scenarios
//!
//! Every test runs the real `git` binary against temporary folders. The
//! hosting provider is replaced by `LocalProvisioner`, which creates bare
//! repositories under the test's `remotes/` directory.

use pretty_assertions::assert_eq;
use publish_core::{
    CancelToken, ErrorKind, PublishConfig, PublishEngine, RepoSetupRequest, SetupOutcome, Step,
    Visibility,
};
use publish_test_utils::git::{bare_remote, commit_count, git, real_git_repo_with_commit, test_identity};
use publish_test_utils::project::PROJECT_NAME;
use publish_test_utils::{LocalProvisioner, RecordingRunner, TestProject};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn request(project: &TestProject) -> RepoSetupRequest {
    RepoSetupRequest::new(project.path()).with_identity(test_identity())
}

fn publish(
    runner: &RecordingRunner,
    provisioner: &LocalProvisioner,
    request: &RepoSetupRequest,
) -> SetupOutcome {
    PublishEngine::new(runner, provisioner, PublishConfig::default()).run(request, &CancelToken::new())
}

fn assert_success(outcome: &SetupOutcome) {
    assert!(
        outcome.is_success(),
        "expected success, got {:?} after {:?}",
        outcome.error,
        outcome.steps
    );
}

// =============================================================================
// Fresh folders
// =============================================================================

#[test]
fn test_empty_folder_is_published() {
    let project = TestProject::new();
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());

    let outcome = publish(&runner, &provisioner, &request(&project));

    assert_success(&outcome);
    assert_eq!(
        outcome.mutating_steps(),
        vec![Step::Init, Step::Commit, Step::CreateRemote, Step::AttachRemote, Step::Push]
    );
    let status = &outcome.final_status;
    assert_eq!((status.ahead, status.behind), (0, 0));
    assert_eq!(status.branch.as_deref(), Some("main"));
    assert_eq!(status.upstream.as_deref(), Some("origin/main"));
    assert_eq!(outcome.remote_url, Some(provisioner.url_for(PROJECT_NAME)));
    assert_eq!(commit_count(&project.remote_path(PROJECT_NAME), "main"), 1);

    let created = provisioner.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, PROJECT_NAME);
    assert_eq!(created[0].visibility, Visibility::Public);
}

#[test]
fn test_folder_with_files_is_staged_and_committed() {
    let project = TestProject::new();
    project.write("README.md", "# Demo\n");
    project.write("src/main.rs", "fn main() {}\n");
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());

    let request = request(&project)
        .with_visibility(Visibility::Private)
        .with_description("A demo project");
    let outcome = publish(&runner, &provisioner, &request);

    assert_success(&outcome);
    assert_eq!(
        outcome.mutating_steps(),
        vec![
            Step::Init,
            Step::Stage,
            Step::Commit,
            Step::CreateRemote,
            Step::AttachRemote,
            Step::Push
        ]
    );
    assert!(outcome.final_status.is_clean());
    assert_eq!(provisioner.created()[0].visibility, Visibility::Private);
    assert_eq!(provisioner.created()[0].description.as_deref(), Some("A demo project"));

    let files = git(&project.remote_path(PROJECT_NAME), &["ls-tree", "-r", "--name-only", "main"]);
    assert_eq!(files.lines().collect::<Vec<_>>(), vec!["README.md", "src/main.rs"]);
}

#[test]
fn test_every_step_is_recorded_in_order() {
    let project = TestProject::new();
    project.write("a.txt", "a");
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());

    let outcome = publish(&runner, &provisioner, &request(&project));

    assert!(outcome.steps.iter().all(|r| r.success));
    assert!(outcome.steps.iter().all(|r| !r.message.is_empty()));
    assert!(outcome.finished_at >= outcome.started_at);
    assert_eq!(provisioner.auth_checks(), 1);
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_second_run_performs_no_mutating_steps() {
    let project = TestProject::new();
    project.write("a.txt", "a");
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());
    let request = request(&project);

    let first = publish(&runner, &provisioner, &request);
    assert_success(&first);

    let second_runner = RecordingRunner::default();
    let second = publish(&second_runner, &provisioner, &request);

    assert_success(&second);
    assert_eq!(second.mutating_steps(), Vec::<Step>::new());
    assert_eq!(second.final_status, first.final_status);
    assert_eq!(second_runner.count("commit"), 0);
    assert_eq!(second_runner.count("push"), 0);
    assert_eq!(provisioner.created().len(), 1);
}

#[test]
fn test_clean_published_repository_needs_nothing() {
    let project = TestProject::new();
    real_git_repo_with_commit(project.path());
    let remote = project.remote_path("existing");
    bare_remote(&remote);
    let remote_url = remote.to_string_lossy().into_owned();
    git(project.path(), &["remote", "add", "origin", &remote_url]);
    git(project.path(), &["push", "--set-upstream", "origin", "main"]);

    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());
    let outcome = publish(&runner, &provisioner, &RepoSetupRequest::new(project.path()));

    assert_success(&outcome);
    assert!(outcome.mutating_steps().is_empty());
    assert_eq!(outcome.remote_url.as_deref(), Some(remote_url.as_str()));
    assert_eq!(provisioner.auth_checks(), 0);
}

#[test]
fn test_new_work_is_committed_and_pushed() {
    let project = TestProject::new();
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());
    let request = request(&project).with_commit_message("Add notes");
    assert_success(&publish(&runner, &provisioner, &request));

    project.write("notes.md", "more\n");
    let outcome = publish(&RecordingRunner::default(), &provisioner, &request);

    assert_success(&outcome);
    assert_eq!(outcome.mutating_steps(), vec![Step::Stage, Step::Commit, Step::Push]);
    let subject = git(&project.remote_path(PROJECT_NAME), &["log", "-1", "--format=%s", "main"]);
    assert_eq!(subject.trim(), "Add notes");
}

#[test]
fn test_edits_inside_a_submodule_need_nothing() {
    let project = TestProject::new();
    let library = project.root().join("library");
    std::fs::create_dir(&library).unwrap();
    real_git_repo_with_commit(&library);
    real_git_repo_with_commit(project.path());
    let library_url = library.to_string_lossy().into_owned();
    git(
        project.path(),
        &["-c", "protocol.file.allow=always", "submodule", "add", &library_url, "library"],
    );
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());
    let request = request(&project);
    assert_success(&publish(&runner, &provisioner, &request));

    project.write("library/README.md", "# Edited inside the submodule\n");
    let outcome = publish(&RecordingRunner::default(), &provisioner, &request);

    assert_success(&outcome);
    assert_eq!(outcome.mutating_steps(), Vec::<Step>::new());
}

// =============================================================================
// Name conflicts
// =============================================================================

#[test]
fn test_name_conflict_halts_before_push() {
    let project = TestProject::new();
    project.write("a.txt", "a");
    bare_remote(&project.remote_path(PROJECT_NAME));
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());

    let outcome = publish(&runner, &provisioner, &request(&project));

    let error = outcome.error.clone().expect("expected NameConflict");
    assert_eq!(error.kind, ErrorKind::NameConflict);
    assert_eq!(error.step, Some(Step::CreateRemote));
    assert!(error.hint.as_deref().unwrap().contains(PROJECT_NAME));
    assert_eq!(
        outcome.mutating_steps(),
        vec![Step::Init, Step::Stage, Step::Commit, Step::CreateRemote]
    );
    assert!(!outcome.steps.last().unwrap().success);
    assert_eq!(runner.count("push"), 0);
    assert_eq!(outcome.final_status.remote_url, None);
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn test_retry_with_alternate_name_after_conflict() {
    let project = TestProject::new();
    project.write("a.txt", "a");
    bare_remote(&project.remote_path(PROJECT_NAME));
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());
    let first = publish(&runner, &provisioner, &request(&project));
    assert_eq!(first.error.unwrap().kind, ErrorKind::NameConflict);

    let retry = request(&project).with_name("demo project 2");
    let outcome = publish(&runner, &provisioner, &retry);

    assert_success(&outcome);
    assert_eq!(
        outcome.mutating_steps(),
        vec![Step::CreateRemote, Step::AttachRemote, Step::Push]
    );
    assert_eq!(provisioner.created()[0].name, "demo-project-2");
    assert_eq!(outcome.remote_url, Some(provisioner.url_for("demo-project-2")));
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancel_after_create_keeps_remote_attached() {
    let project = TestProject::new();
    project.write("a.txt", "a");
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let provisioner = LocalProvisioner::new(project.remotes()).on_create(move || trigger.cancel());
    let runner = RecordingRunner::default();
    let engine = PublishEngine::new(&runner, &provisioner, PublishConfig::default());

    let outcome = engine.run(&request(&project), &cancel);

    assert!(outcome.cancelled);
    assert!(outcome.error.is_none());
    assert_eq!(
        outcome.mutating_steps(),
        vec![
            Step::Init,
            Step::Stage,
            Step::Commit,
            Step::CreateRemote,
            Step::AttachRemote
        ]
    );
    assert_eq!(runner.count("push"), 0);
    assert!(outcome.final_status.remote_url.is_some());

    // Resuming picks up where the cancelled run stopped.
    let resumed = engine.run(&request(&project), &CancelToken::new());
    assert_success(&resumed);
    assert_eq!(resumed.mutating_steps(), vec![Step::Push]);
}

// =============================================================================
// Reporting
// =============================================================================

#[test]
fn test_outcome_serializes_for_front_ends() {
    let project = TestProject::new();
    let runner = RecordingRunner::default();
    let provisioner = LocalProvisioner::new(project.remotes());

    let outcome = publish(&runner, &provisioner, &request(&project));
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["steps"][0]["step"], "init");
    assert_eq!(json["steps"][2]["step"], "create-remote");
    assert_eq!(json["final_status"]["branch"], "main");
    assert_eq!(json["error"], serde_json::Value::Null);
    assert!(json["started_at"].is_string());
}
