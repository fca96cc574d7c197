//! [`LocalProvisioner`]: creates bare repositories on disk.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use publish_github::{Error, RemoteProvisioner, RemoteSpec, Result};

use crate::git::bare_remote;

/// Stands in for GitHub. `create_remote` makes `<root>/<name>.git` and
/// returns its path as the remote URL.
pub struct LocalProvisioner {
    root: PathBuf,
    authenticated: bool,
    created: RefCell<Vec<RemoteSpec>>,
    auth_checks: Cell<usize>,
    on_create: Option<Box<dyn Fn()>>,
}

impl LocalProvisioner {
    /// An authenticated provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            authenticated: true,
            created: RefCell::new(Vec::new()),
            auth_checks: Cell::new(0),
            on_create: None,
        }
    }

    /// A provider that accepts requests only when a token is supplied.
    pub fn unauthenticated(root: impl Into<PathBuf>) -> Self {
        Self {
            authenticated: false,
            ..Self::new(root)
        }
    }

    /// Run `hook` after each successful creation, e.g. to cancel a workflow.
    pub fn on_create(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    /// URL that `create_remote` returns for `name`.
    pub fn url_for(&self, name: &str) -> String {
        self.root.join(format!("{name}.git")).to_string_lossy().into_owned()
    }

    /// Every successfully created repository, in order.
    pub fn created(&self) -> Vec<RemoteSpec> {
        self.created.borrow().clone()
    }

    pub fn auth_checks(&self) -> usize {
        self.auth_checks.get()
    }
}

impl RemoteProvisioner for LocalProvisioner {
    fn ensure_authenticated(&self, _folder: &Path, token: Option<&str>) -> Result<()> {
        self.auth_checks.set(self.auth_checks.get() + 1);
        if self.authenticated || token.is_some_and(|t| !t.is_empty()) {
            Ok(())
        } else {
            Err(Error::AuthRequired {
                message: "not logged in".into(),
            })
        }
    }

    fn create_remote(&self, _folder: &Path, spec: &RemoteSpec, _token: Option<&str>) -> Result<String> {
        let path = self.root.join(format!("{}.git", spec.name));
        if path.exists() {
            return Err(Error::NameConflict {
                name: spec.name.clone(),
            });
        }
        bare_remote(&path);
        self.created.borrow_mut().push(spec.clone());
        if let Some(hook) = &self.on_create {
            hook();
        }
        Ok(path.to_string_lossy().into_owned())
    }
}
