//! AWS implementations of the fan-out collaborators.
//!
//! The SDK clients are async; the collaborator traits are synchronous so they
//! can be called from pool worker threads. Each adapter keeps a handle to the
//! tokio runtime that built its client and blocks on it per call.

pub mod adapters;
pub mod session_config;

pub use adapters::organizations::OrganizationsDirectory;
pub use adapters::sts::StsCredentialIssuer;
pub use session_config::session_sdk_config;
