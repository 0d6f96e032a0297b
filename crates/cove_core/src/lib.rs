//! Shared multi-account fan-out domain primitives.
//!
//! This crate owns account identity, target resolution, session records and
//! the output partition. Concurrency lives in `cove_runner`, AWS SDK
//! adapters in `cove_aws`.

pub mod account;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod resolver;

pub use account::{role_arn, AccountId, AccountMetadata, AccountStatus, IgnoreSet, TargetSet};
pub use collaborators::{AccountDirectory, CredentialIssuer};
pub use config::{CoveConfig, RunnerKind};
pub use error::{CoveError, Result, ServiceError, ValidationError};
pub use output::{CoveOutput, ExecutionOutcome};
pub use record::{
    AccountDetails, AccountSession, AccountSessionRecord, Credentials, ErrorDetail, ErrorKind,
};
pub use resolver::AccountSetResolver;
