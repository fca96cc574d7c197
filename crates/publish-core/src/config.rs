//! Configuration with layered resolution
//!
//! [`ConfigResolver`] merges, field by field:
//! 1. Built-in defaults
//! 2. Global file (`<config_dir>/gh-publish/config.toml`), if present
//! 3. An explicit file named by the caller
//!
//! Later layers override earlier ones. Invalid TOML or an unknown key in any
//! layer is an [`Error::Config`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a branch that is behind its upstream is brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullPolicy {
    /// Merge, creating a merge commit when histories diverged
    #[default]
    Merge,
    /// Refuse anything but a fast-forward
    FastForwardOnly,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Canonical remote managed by the tool
    pub remote_name: String,
    /// Branch created by init
    pub default_branch: String,
    pub initial_commit_message: String,
    pub update_commit_message: String,
    /// Budget for one attempt of a network-bound command
    pub network_timeout_secs: u64,
    pub git_program: String,
    pub gh_program: String,
    pub pull_policy: PullPolicy,
    /// Refresh remote-tracking refs before deciding whether to pull
    pub fetch_before_push: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote_name: "origin".to_string(),
            default_branch: "main".to_string(),
            initial_commit_message: "Initial commit".to_string(),
            update_commit_message: "Update repository".to_string(),
            network_timeout_secs: 60,
            git_program: "git".to_string(),
            gh_program: "gh".to_string(),
            pull_policy: PullPolicy::Merge,
            fetch_before_push: true,
        }
    }
}

impl PublishConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        let ConfigLayer {
            remote_name,
            default_branch,
            initial_commit_message,
            update_commit_message,
            network_timeout_secs,
            git_program,
            gh_program,
            pull_policy,
            fetch_before_push,
        } = layer;

        if let Some(v) = remote_name {
            self.remote_name = v;
        }
        if let Some(v) = default_branch {
            self.default_branch = v;
        }
        if let Some(v) = initial_commit_message {
            self.initial_commit_message = v;
        }
        if let Some(v) = update_commit_message {
            self.update_commit_message = v;
        }
        if let Some(v) = network_timeout_secs {
            self.network_timeout_secs = v;
        }
        if let Some(v) = git_program {
            self.git_program = v;
        }
        if let Some(v) = gh_program {
            self.gh_program = v;
        }
        if let Some(v) = pull_policy {
            self.pull_policy = v;
        }
        if let Some(v) = fetch_before_push {
            self.fetch_before_push = v;
        }
    }
}

/// One configuration file; absent keys leave earlier layers untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    remote_name: Option<String>,
    default_branch: Option<String>,
    initial_commit_message: Option<String>,
    update_commit_message: Option<String>,
    network_timeout_secs: Option<u64>,
    git_program: Option<String>,
    gh_program: Option<String>,
    pull_policy: Option<PullPolicy>,
    fetch_before_push: Option<bool>,
}

/// Resolves [`PublishConfig`] from defaults and configuration files.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit: Option<PathBuf>,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver reading the platform global config file:
    /// - Linux: `~/.config/gh-publish/config.toml`
    /// - macOS: `~/Library/Application Support/gh-publish/config.toml`
    /// - Windows: `%APPDATA%\gh-publish\config.toml`
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file that overrides the global one. Unlike the global file it
    /// must exist.
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Use `dir` instead of the platform config directory.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    fn global_config_path(&self) -> Option<PathBuf> {
        let dir = match &self.global_config_dir_override {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()?.join("gh-publish"),
        };
        Some(dir.join("config.toml"))
    }

    /// Resolve the effective configuration.
    ///
    /// Layers are applied in order: built-in defaults, the global file (if
    /// present), then the explicit file. A later layer overrides only the
    /// keys it sets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the explicit file is missing, or if any
    /// file cannot be read, is not valid TOML, or contains unknown keys.
    pub fn resolve(&self) -> Result<PublishConfig> {
        let mut config = PublishConfig::default();

        if let Some(global) = self.global_config_path() {
            if global.is_file() {
                tracing::debug!(path = %global.display(), "Loading global config");
                config.apply(load_layer(&global)?);
            } else {
                tracing::debug!(path = %global.display(), "No global config");
            }
        }

        if let Some(explicit) = &self.explicit {
            tracing::debug!(path = %explicit.display(), "Loading explicit config");
            config.apply(load_layer(explicit)?);
        }

        Ok(config)
    }
}

fn load_layer(path: &Path) -> Result<ConfigLayer> {
    let content = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn resolver_in(temp: &TempDir) -> ConfigResolver {
        ConfigResolver::new().with_global_config_dir(temp.path().join("global"))
    }

    #[test]
    fn test_defaults_without_files() {
        let temp = TempDir::new().unwrap();
        let config = resolver_in(&temp).resolve().unwrap();
        assert_eq!(config, PublishConfig::default());
        assert_eq!(config.network_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_explicit_overrides_global_field_by_field() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global");
        fs::create_dir_all(&global).unwrap();
        fs::write(
            global.join("config.toml"),
            "default_branch = \"trunk\"\nnetwork_timeout_secs = 10\n",
        )
        .unwrap();
        let explicit = temp.path().join("local.toml");
        fs::write(&explicit, "network_timeout_secs = 5\npull_policy = \"fast-forward-only\"\n").unwrap();

        let config = resolver_in(&temp)
            .with_explicit(Some(explicit))
            .resolve()
            .unwrap();

        assert_eq!(config.default_branch, "trunk");
        assert_eq!(config.network_timeout_secs, 5);
        assert_eq!(config.pull_policy, PullPolicy::FastForwardOnly);
        assert_eq!(config.remote_name, "origin");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = resolver_in(&temp)
            .with_explicit(Some(temp.path().join("nope.toml")))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unknown_key_is_error() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("bad.toml");
        fs::write(&explicit, "remote = \"upstream\"\n").unwrap();

        let err = resolver_in(&temp)
            .with_explicit(Some(explicit))
            .resolve()
            .unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::ExecutionFailed);
    }
}
