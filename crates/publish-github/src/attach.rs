//! Attach a provisioned URL as the canonical remote

use publish_exec::CommandRunner;
use publish_git::Git;

use crate::{Error, Result};

/// What [`attach_remote`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Added,
    /// The remote already pointed at the same repository
    AlreadyAttached,
}

/// Point remote `name` at `url`.
///
/// A no-op when the remote already refers to the same repository (ignoring a
/// trailing `/` or `.git`). A remote with a different URL is
/// [`Error::RemoteConflict`] and is left untouched.
pub fn attach_remote<R: CommandRunner + ?Sized>(git: &Git<'_, R>, name: &str, url: &str) -> Result<Attachment> {
    match git.remote_url(name)? {
        None => {
            git.add_remote(name, url)?;
            tracing::info!(remote = name, url, "Attached remote");
            Ok(Attachment::Added)
        }
        Some(existing) if same_repository(&existing, url) => {
            tracing::debug!(remote = name, url, "Remote already attached");
            Ok(Attachment::AlreadyAttached)
        }
        Some(existing) => Err(Error::RemoteConflict {
            name: name.to_string(),
            existing,
            requested: url.to_string(),
        }),
    }
}

fn same_repository(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(url: &str) -> &str {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url)
}
