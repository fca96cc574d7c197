//! Provisioner trait and request types

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Visibility of a newly created repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    /// Flag understood by `gh repo create`.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Public => "--public",
            Self::Private => "--private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// What to create on the hosting provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    pub name: String,
    pub visibility: Visibility,
    pub description: Option<String>,
}

impl RemoteSpec {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }
}

/// Creates remote repositories on a hosting provider.
///
/// `folder` is the working directory for any provider tool; `token` is the
/// caller-supplied credential, used only when the provider is not already
/// authenticated.
pub trait RemoteProvisioner {
    /// Confirm a usable credential exists.
    ///
    /// Fails with [`crate::Error::AuthRequired`] otherwise.
    fn ensure_authenticated(&self, folder: &Path, token: Option<&str>) -> Result<()>;

    /// Create the repository and return its clone URL.
    ///
    /// An existing repository of the same name is
    /// [`crate::Error::NameConflict`]; it is never reused.
    fn create_remote(&self, folder: &Path, spec: &RemoteSpec, token: Option<&str>) -> Result<String>;
}

impl<T: RemoteProvisioner + ?Sized> RemoteProvisioner for &T {
    fn ensure_authenticated(&self, folder: &Path, token: Option<&str>) -> Result<()> {
        (**self).ensure_authenticated(folder, token)
    }

    fn create_remote(&self, folder: &Path, spec: &RemoteSpec, token: Option<&str>) -> Result<String> {
        (**self).create_remote(folder, spec, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_flags() {
        assert_eq!(Visibility::Public.flag(), "--public");
        assert_eq!(Visibility::Private.flag(), "--private");
        assert_eq!(Visibility::default(), Visibility::Public);
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let spec = RemoteSpec::new("demo", Visibility::Private).with_description(Some("  ".into()));
        assert_eq!(spec.description, None);
    }
}
