//! git command helpers and repository fixtures.

use std::fs;
use std::path::Path;
use std::process::Command;

use publish_git::Identity;

/// Identity used by every fixture commit.
pub fn test_identity() -> Identity {
    Identity::new("Test User", "test@example.com")
}

/// Run `git <args>` in `dir` and return stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits nonzero.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Configure the fixture identity and disable signing in an existing repo.
pub fn configure_identity(dir: &Path) {
    let identity = test_identity();
    git(dir, &["config", "user.email", &identity.email]);
    git(dir, &["config", "user.name", &identity.name]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Initialise a repository on `main` with one commit containing `README.md`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    git(path, &["init"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(path);

    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Create a bare repository at `path` using `git2`, with HEAD on `main`.
///
/// # Panics
/// Panics if the repository cannot be created.
pub fn bare_remote(path: &Path) -> git2::Repository {
    let repo = git2::Repository::init_bare(path).unwrap_or_else(|e| {
        panic!("bare_remote: failed to init bare repository at {}: {e}", path.display())
    });
    repo.set_head("refs/heads/main")
        .unwrap_or_else(|e| panic!("bare_remote: failed to set HEAD: {e}"));
    repo
}

/// Clone `remote` into `dest` and configure the fixture identity there.
pub fn clone_into(remote: &Path, dest: &Path) {
    let parent = dest.parent().expect("clone destination has a parent");
    let remote = remote.to_string_lossy();
    let dest_str = dest.to_string_lossy();
    git(parent, &["clone", remote.as_ref(), dest_str.as_ref()]);
    configure_identity(dest);
}

/// Write `content` to `file` under `dir`, stage it, and commit with `message`.
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "-m", message]);
}

/// Number of commits reachable from `reference` in a bare or non-bare repo.
pub fn commit_count(repo_path: &Path, reference: &str) -> usize {
    let repo = git2::Repository::open(repo_path)
        .unwrap_or_else(|e| panic!("commit_count: cannot open {}: {e}", repo_path.display()));
    let Ok(target) = repo.revparse_single(reference) else {
        return 0;
    };
    let mut walk = repo.revwalk().unwrap();
    walk.push(target.id()).unwrap();
    walk.count()
}
