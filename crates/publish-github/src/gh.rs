//! [`RemoteProvisioner`] backed by the GitHub CLI

use std::path::Path;
use std::sync::LazyLock;

use publish_exec::{CommandOutput, CommandRunner, Invocation};
use publish_git::classify::{Failure, classify};
use regex::Regex;

use crate::provisioner::{RemoteProvisioner, RemoteSpec};
use crate::{Error, Result};

/// `gh repo create` prints the web URL of the new repository
static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://[A-Za-z0-9.-]+/[A-Za-z0-9._-]+/[A-Za-z0-9._-]+")
        .expect("Invalid repository URL regex")
});

const NAME_TAKEN: &str = "name already exists";

/// Drives `gh auth status` and `gh repo create` through a [`CommandRunner`].
///
/// Both calls are network-bound and share the runner's timeout budget. A
/// caller-supplied token is handed to `gh` through `GH_TOKEN` on those two
/// invocations only.
pub struct GhProvisioner<R> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> GhProvisioner<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn invocation(&self, folder: &Path, token: Option<&str>) -> Invocation {
        let mut inv = Invocation::new(self.program.as_str(), folder)
            .network()
            .env("GH_PROMPT_DISABLED", "1")
            .env("NO_COLOR", "1");
        if let Some(token) = token {
            inv = inv.env("GH_TOKEN", token);
        }
        inv
    }
}

impl<R: CommandRunner> RemoteProvisioner for GhProvisioner<R> {
    fn ensure_authenticated(&self, folder: &Path, token: Option<&str>) -> Result<()> {
        let inv = self.invocation(folder, token).args(["auth", "status"]);
        let output = self.runner.run(&inv)?;
        if output.success() {
            tracing::debug!(with_token = token.is_some(), "GitHub CLI is authenticated");
            return Ok(());
        }

        match classify(&output.combined()) {
            Failure::Network => Err(Error::Network {
                message: output.diagnostic(),
            }),
            // gh auth status only fails for missing or rejected credentials
            Failure::Auth | Failure::Other => Err(Error::AuthRequired {
                message: output.diagnostic(),
            }),
        }
    }

    fn create_remote(&self, folder: &Path, spec: &RemoteSpec, token: Option<&str>) -> Result<String> {
        let mut inv = self
            .invocation(folder, token)
            .args(["repo", "create", spec.name.as_str(), spec.visibility.flag()]);
        if let Some(description) = &spec.description {
            inv = inv.arg("--description").arg(description.as_str());
        }

        let output = self.runner.run(&inv)?;
        if !output.success() {
            return Err(create_failure(spec, &output));
        }

        let url = clone_url(&output.stdout).ok_or_else(|| {
            Error::provider(format!(
                "could not find a repository URL in gh output: {}",
                output.stdout.trim()
            ))
        })?;
        tracing::info!(name = %spec.name, visibility = %spec.visibility, url = %url, "Created GitHub repository");
        Ok(url)
    }
}

fn create_failure(spec: &RemoteSpec, output: &CommandOutput) -> Error {
    let text = output.combined();
    if text.to_lowercase().contains(NAME_TAKEN) {
        return Error::NameConflict {
            name: spec.name.clone(),
        };
    }
    match classify(&text) {
        Failure::Auth => Error::AuthRequired {
            message: output.diagnostic(),
        },
        Failure::Network => Error::Network {
            message: output.diagnostic(),
        },
        Failure::Other => Error::provider(output.diagnostic()),
    }
}

/// First repository URL in `stdout`, as an HTTPS clone URL.
fn clone_url(stdout: &str) -> Option<String> {
    let found = REPO_URL.find(stdout)?.as_str();
    if found.ends_with(".git") {
        Some(found.to_string())
    } else {
        Some(format!("{found}.git"))
    }
}
