//! Git status inspection and working-copy operations for gh-publish
//!
//! All git access goes through the `git` binary via a
//! [`publish_exec::CommandRunner`]. Tool output is parsed with a strict
//! grammar (porcelain v2 for status) and unrecognized output is an error
//! rather than a best guess.

pub mod classify;
pub mod error;
pub mod ops;
pub mod porcelain;
pub mod status;

pub use error::{Error, Result};
pub use ops::{Git, Identity};
pub use status::{CommitSummary, RepositoryStatus};
