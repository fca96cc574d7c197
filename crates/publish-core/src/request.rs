//! Caller input for one workflow run

use std::fmt;
use std::path::PathBuf;

use publish_git::Identity;
use publish_github::Visibility;

/// What the caller wants done with a folder.
///
/// Identity and token are explicit inputs; the engine never reads them from
/// the environment.
#[derive(Clone)]
pub struct RepoSetupRequest {
    pub folder: PathBuf,
    pub visibility: Visibility,
    pub description: Option<String>,
    pub should_push: bool,
    /// Commit author, needed only when git has none configured
    pub identity: Option<Identity>,
    /// Provider token, needed only when the provider CLI is not logged in
    pub access_token: Option<String>,
    /// Repository name override; defaults to the folder base name
    pub name: Option<String>,
    pub commit_message: Option<String>,
}

impl RepoSetupRequest {
    /// A public, pushing request for `folder`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            visibility: Visibility::Public,
            description: None,
            should_push: true,
            identity: None,
            access_token: None,
            name: None,
            commit_message: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_push(mut self, should_push: bool) -> Self {
        self.should_push = should_push;
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}

impl fmt::Debug for RepoSetupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoSetupRequest")
            .field("folder", &self.folder)
            .field("visibility", &self.visibility)
            .field("description", &self.description)
            .field("should_push", &self.should_push)
            .field("identity", &self.identity)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("commit_message", &self.commit_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = RepoSetupRequest::new("/tmp/demo");
        assert_eq!(request.visibility, Visibility::Public);
        assert!(request.should_push);
        assert!(request.identity.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let request = RepoSetupRequest::new("/tmp/demo").with_access_token("ghp_secret");
        let debug = format!("{request:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
