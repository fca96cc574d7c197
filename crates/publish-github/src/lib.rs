//! GitHub repository provisioning for gh-publish
//!
//! [`RemoteProvisioner`] is the seam between the reconciliation engine and
//! the hosting provider. [`GhProvisioner`] implements it on top of the `gh`
//! CLI; tests substitute a provisioner that creates local bare repositories.
//! [`attach_remote`] wires the created URL into the local repository without
//! ever overwriting a different remote.

pub mod attach;
pub mod error;
pub mod gh;
pub mod naming;
pub mod provisioner;

pub use attach::{Attachment, attach_remote};
pub use error::{Error, Result};
pub use gh::GhProvisioner;
pub use naming::{browse_url, repository_name_for, sanitize_repository_name};
pub use provisioner::{RemoteProvisioner, RemoteSpec, Visibility};
