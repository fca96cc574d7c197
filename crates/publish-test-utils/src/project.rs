//! [`TestProject`] builder for publish scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Folder name used for the project under test. The derived repository name
/// is therefore always `demo-project`.
pub const PROJECT_NAME: &str = "demo-project";

/// A temporary workspace holding a project folder and a `remotes/`
/// directory where [`crate::LocalProvisioner`] creates bare repositories.
pub struct TestProject {
    temp_dir: TempDir,
    project: PathBuf,
    remotes: PathBuf,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty project folder.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join(PROJECT_NAME);
        let remotes = temp_dir.path().join("remotes");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&remotes).unwrap();
        Self {
            temp_dir,
            project,
            remotes,
        }
    }

    /// Root of the temporary workspace.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The project folder being published.
    pub fn path(&self) -> &Path {
        &self.project
    }

    /// Directory that stands in for the hosting provider.
    pub fn remotes(&self) -> &Path {
        &self.remotes
    }

    /// Path of the bare repository created for `name`.
    pub fn remote_path(&self, name: &str) -> PathBuf {
        self.remotes.join(format!("{name}.git"))
    }

    /// Write `content` to `relative` inside the project, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.project.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Assert that `relative` exists inside the project.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.project.join(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
