//! Child-process execution for gh-publish
//!
//! Every external tool the workspace drives (`git`, `gh`) is spawned through
//! a [`CommandRunner`]. A nonzero exit status is never an error at this layer:
//! callers receive a [`CommandOutput`] and decide what the exit code means for
//! their subcommand. Errors are reserved for the cases where no output exists
//! at all: the binary cannot be found, the working directory is unusable, or a
//! network-bound command exceeded its time budget.

pub mod error;
pub mod invocation;
pub mod runner;

pub use error::{Error, Result};
pub use invocation::{CommandOutput, Invocation, Reach};
pub use runner::{CommandRunner, ProcessRunner};
