//! Strict parser for `git status --porcelain=v2 --branch -z`
//!
//! Grammar (records separated by NUL):
//!
//! ```text
//! # branch.oid <commit> | (initial)
//! # branch.head <branch> | (detached)
//! # branch.upstream <upstream-branch>
//! # branch.ab +<ahead> -<behind>
//! 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
//! 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path> NUL <origPath>
//! u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
//! ? <path>
//! ! <path>
//! ```
//!
//! Unknown `#` headers are skipped as git documents; any other unexpected
//! record is a parse error.

use crate::{Error, Result};

/// Parsed porcelain v2 output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Porcelain {
    /// `false` when `branch.oid` is `(initial)`
    pub has_commits: bool,
    /// `None` when HEAD is detached
    pub head: Option<String>,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub staged: Vec<String>,
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    pub conflicted: Vec<String>,
}

/// Parse NUL-separated porcelain v2 output.
pub fn parse(output: &str) -> Result<Porcelain> {
    let mut status = Porcelain::default();
    let mut saw_oid = false;
    let mut saw_head = false;
    let mut records = output.split('\0').filter(|r| !r.is_empty());

    while let Some(record) = records.next() {
        let (kind, rest) = record
            .split_once(' ')
            .ok_or_else(|| malformed(record, "missing record type"))?;

        match kind {
            "#" => parse_header(rest, &mut status, &mut saw_oid, &mut saw_head)?,
            "1" => {
                let fields = fields(rest, 8, record)?;
                push_change(&mut status, fields[0], fields[1], fields[7], record)?;
            }
            "2" => {
                let fields = fields(rest, 9, record)?;
                push_change(&mut status, fields[0], fields[1], fields[8], record)?;
                // The original path of a rename/copy follows as its own record.
                records
                    .next()
                    .ok_or_else(|| malformed(record, "rename without original path"))?;
            }
            "u" => {
                let fields = fields(rest, 10, record)?;
                status.conflicted.push(fields[9].to_string());
            }
            "?" => status.untracked.push(rest.to_string()),
            "!" => {}
            _ => return Err(malformed(record, "unknown record type")),
        }
    }

    if !saw_oid || !saw_head {
        return Err(Error::status_unavailable(
            "git status output is missing branch headers",
        ));
    }

    Ok(status)
}

fn parse_header(
    rest: &str,
    status: &mut Porcelain,
    saw_oid: &mut bool,
    saw_head: &mut bool,
) -> Result<()> {
    let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
    match key {
        "branch.oid" => {
            *saw_oid = true;
            status.has_commits = value != "(initial)";
        }
        "branch.head" => {
            *saw_head = true;
            if value.is_empty() {
                return Err(malformed(rest, "empty branch.head"));
            }
            status.head = (value != "(detached)").then(|| value.to_string());
        }
        "branch.upstream" => {
            if value.is_empty() {
                return Err(malformed(rest, "empty branch.upstream"));
            }
            status.upstream = Some(value.to_string());
        }
        "branch.ab" => {
            let (ahead, behind) = value
                .split_once(' ')
                .ok_or_else(|| malformed(rest, "branch.ab needs two counts"))?;
            status.ahead = count(ahead, '+', rest)?;
            status.behind = count(behind, '-', rest)?;
        }
        _ => tracing::debug!(header = %rest, "Skipping unknown porcelain header"),
    }
    Ok(())
}

/// Split `rest` into exactly `n` space separated fields; the last field is
/// the path and may itself contain spaces.
fn fields<'a>(rest: &'a str, n: usize, record: &str) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = rest.splitn(n, ' ').collect();
    if fields.len() != n || fields[n - 1].is_empty() {
        return Err(malformed(record, "wrong number of fields"));
    }
    Ok(fields)
}

/// Record a changed entry. A submodule whose commit is unchanged (`<sub>`
/// of `S.M.`, `S..U` or `S.MU`) is not modified for the outer repository:
/// `git add` cannot stage content inside it.
fn push_change(
    status: &mut Porcelain,
    xy: &str,
    sub: &str,
    path: &str,
    record: &str,
) -> Result<()> {
    let mut chars = xy.chars();
    let (Some(index), Some(worktree), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(malformed(record, "XY must be two characters"));
    };
    let commit_unchanged = match sub.as_bytes() {
        [b'N', b'.', b'.', b'.'] => false,
        [b'S', commit, _, _] => *commit == b'.',
        _ => return Err(malformed(record, "invalid submodule state")),
    };

    if index != '.' {
        status.staged.push(path.to_string());
    }
    if worktree == 'M' && commit_unchanged {
        tracing::debug!(path, sub, "Skipping submodule with changes only inside it");
    } else if worktree != '.' {
        status.modified.push(path.to_string());
    }
    Ok(())
}

fn count(field: &str, sign: char, record: &str) -> Result<u32> {
    field
        .strip_prefix(sign)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| malformed(record, "invalid ahead/behind count"))
}

fn malformed(record: &str, reason: &str) -> Error {
    Error::status_unavailable(format!(
        "unrecognized git status record ({reason}): {:?}",
        record
    ))
}
