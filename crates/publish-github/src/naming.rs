//! Repository naming and browser URLs

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// `git@host:owner/repo(.git)` or `https://host/owner/repo(.git)`
static REMOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://(?:[^@/]+@)?|ssh://git@|git@)([^/:]+)[:/]([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("Invalid remote URL regex")
});

/// Convert an arbitrary string into a repository name.
///
/// Characters outside `[A-Za-z0-9._-]` become `-`, runs of `-` collapse and
/// leading or trailing `-` are removed. May return an empty string.
pub fn sanitize_repository_name(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut last_was_dash = true; // skip leading dashes

    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            result.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

/// Repository name derived from the folder's base name, or `None` if nothing
/// usable remains after sanitizing.
pub fn repository_name_for(folder: &Path) -> Option<String> {
    let base = folder.file_name()?.to_string_lossy();
    let name = sanitize_repository_name(&base);
    (!name.is_empty()).then_some(name)
}

/// Web page for a remote URL, e.g. `git@github.com:o/r.git` becomes
/// `https://github.com/o/r`. `None` for URLs that are not host/owner/repo
/// shaped (local paths, file URLs).
pub fn browse_url(remote_url: &str) -> Option<String> {
    let caps = REMOTE_URL.captures(remote_url.trim())?;
    Some(format!("https://{}/{}/{}", &caps[1], &caps[2], &caps[3]))
}
