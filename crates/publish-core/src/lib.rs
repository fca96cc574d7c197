//! Reconciliation engine and outcome reporting for gh-publish
//!
//! [`PublishEngine`] turns a [`RepoSetupRequest`] into a [`SetupOutcome`]:
//! it re-inspects the folder before every step, runs only the steps the
//! current state calls for, and stops at the first failure with the error
//! classified into an [`ErrorKind`].
//!
//! Front ends call [`run_setup_workflow`] (or build a [`PublishEngine`] with
//! their own runner and provisioner) and render the outcome;
//! [`inspect_folder`] gives the status alone.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod request;

pub use cancel::CancelToken;
pub use config::{ConfigResolver, PublishConfig, PullPolicy};
pub use engine::{PublishEngine, inspect_folder, run_setup_workflow};
pub use error::{Error, ErrorDetail, ErrorKind, Result};
pub use outcome::{OutcomeRecorder, SetupOutcome, Step, StepRecord};
pub use request::RepoSetupRequest;

pub use publish_git::{Identity, RepositoryStatus};
pub use publish_github::{Visibility, browse_url};
