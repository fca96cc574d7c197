//! Repository status snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Format passed to `git log -1`: full hash, committer time, subject
pub(crate) const LAST_COMMIT_FORMAT: &str = "--format=%H%x00%ct%x00%s";

/// Tip commit of the current branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Full object id
    pub id: String,
    pub committed_at: DateTime<Utc>,
    /// First line of the message
    pub subject: String,
}

impl CommitSummary {
    /// Parse one `git log -1` record written with [`LAST_COMMIT_FORMAT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::StatusUnavailable`] unless the output is exactly a
    /// hex object id, a Unix timestamp and a subject separated by NUL.
    pub fn parse(output: &str) -> Result<Self> {
        let record = output.strip_suffix('\n').unwrap_or(output);
        let mut fields = record.splitn(3, '\0');
        let (Some(id), Some(timestamp), Some(subject)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(unrecognized(output));
        };

        let id_valid = matches!(id.len(), 40 | 64) && id.bytes().all(|b| b.is_ascii_hexdigit());
        if !id_valid || subject.contains('\0') || subject.contains('\n') {
            return Err(unrecognized(output));
        }
        let committed_at = timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| unrecognized(output))?;

        Ok(Self {
            id: id.to_string(),
            committed_at,
            subject: subject.to_string(),
        })
    }

    /// First seven characters of the id.
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }
}

fn unrecognized(output: &str) -> Error {
    Error::status_unavailable(format!("unrecognized git log output: {output:?}"))
}

/// Immutable snapshot of a folder's version-control state.
///
/// Rebuilt on every inspection and never cached. When
/// `is_version_controlled` is `false` every other field is empty, `None` or
/// zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub is_version_controlled: bool,
    /// Current branch; `None` before the first commit or on a detached HEAD
    pub branch: Option<String>,
    pub has_commits: bool,
    /// URL of the canonical remote, if configured
    pub remote_url: Option<String>,
    /// Remote-tracking ref of the current branch, e.g. `origin/main`
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    /// Index differs from HEAD
    pub staged: Vec<String>,
    /// Working tree differs from the index
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    /// Unmerged paths left by an unfinished merge
    pub conflicted: Vec<String>,
    /// `None` until the first commit
    pub last_commit: Option<CommitSummary>,
}

impl RepositoryStatus {
    /// Status of a folder that is not under version control.
    pub fn not_version_controlled() -> Self {
        Self::default()
    }

    /// No staged, modified, untracked or conflicted paths.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }

    /// Working-tree changes that `git add --all` would pick up.
    pub fn has_unstaged_changes(&self) -> bool {
        !self.modified.is_empty() || !self.untracked.is_empty()
    }

    /// Local and remote both moved since the last sync.
    pub fn is_diverged(&self) -> bool {
        self.ahead > 0 && self.behind > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ID: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn test_not_version_controlled_is_empty() {
        let status = RepositoryStatus::not_version_controlled();
        assert!(!status.is_version_controlled);
        assert!(status.branch.is_none());
        assert!(status.remote_url.is_none());
        assert_eq!((status.ahead, status.behind), (0, 0));
        assert!(status.is_clean());
    }

    #[test]
    fn test_parse_last_commit() {
        let summary = CommitSummary::parse(&format!("{ID}\01700000000\0Add a: b\n")).unwrap();

        assert_eq!(summary.id, ID);
        assert_eq!(summary.short_id(), "0123456");
        assert_eq!(summary.committed_at.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(summary.subject, "Add a: b");
    }

    #[test]
    fn test_parse_last_commit_allows_empty_subject() {
        let summary = CommitSummary::parse(&format!("{ID}\01700000000\0\n")).unwrap();
        assert_eq!(summary.subject, "");
    }

    #[test]
    fn test_parse_last_commit_rejects_unexpected_output() {
        let outputs = [
            String::new(),
            "fatal: bad default revision 'HEAD'\n".to_string(),
            "0123456\01700000000\0short id\n".to_string(),
            format!("{ID}\0yesterday\0bad time\n"),
            format!("{ID}\01700000000\n"),
            format!("{ID}\01700000000\0one\ntwo\n"),
        ];
        for output in &outputs {
            let err = CommitSummary::parse(output).unwrap_err();
            assert!(matches!(err, Error::StatusUnavailable { .. }), "{output:?}");
        }
    }

    #[test]
    fn test_only_staged_needs_no_staging() {
        let status = RepositoryStatus {
            is_version_controlled: true,
            staged: vec!["a.txt".into()],
            ..Default::default()
        };
        assert!(!status.is_clean());
        assert!(!status.has_unstaged_changes());
    }
}
