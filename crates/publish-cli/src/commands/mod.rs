//! Command implementations for publish-cli

pub mod doctor;
pub mod publish;
pub mod status;

pub use doctor::run_doctor;
pub use publish::run_publish;
pub use status::run_status;
