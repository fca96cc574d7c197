//! Shared test fixtures for the gh-publish workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git command helpers and repository fixtures
//! - [`project`]: [`TestProject`]: a scratch folder plus a directory for
//!   bare "remote" repositories
//! - [`provisioner`]: [`LocalProvisioner`], a provider that creates bare
//!   repositories on disk instead of on GitHub
//! - [`runner`]: [`RecordingRunner`], which logs every invocation

pub mod git;
pub mod project;
pub mod provisioner;
pub mod runner;

pub use project::TestProject;
pub use provisioner::LocalProvisioner;
pub use runner::RecordingRunner;
