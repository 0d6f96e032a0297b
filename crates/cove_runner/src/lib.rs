//! Concurrent fan-out of one operation across many organization accounts.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cove_core::{AccountDirectory, CoveConfig, CredentialIssuer};
//! use cove_runner::Cove;
//!
//! fn audit(directory: Arc<dyn AccountDirectory>, issuer: Arc<dyn CredentialIssuer>) {
//!     let config = CoveConfig::default().with_ignore_ids(["123456789012"]);
//!     let cove = Cove::new(config, directory, issuer);
//!
//!     let output = cove
//!         .run(|session| Ok::<_, String>(session.role_arn().to_string()))
//!         .expect("at least one account should be reachable");
//!     println!("{} results", output.results.len());
//! }
//! ```
//!
//! # Architecture
//!
//! - [`strategy`]: how units of work are scheduled (pooled, sequential, streaming)
//! - [`sessions`]: concurrent credential acquisition per target account
//! - [`execution`]: concurrent invocation of the caller's operation
//! - [`cove`]: the pipeline composing resolver, establisher, runner and partition
//! - [`export`]: JSON/CSV export of a run's output

pub mod cove;
pub mod execution;
pub mod export;
mod progress;
pub mod sessions;
pub mod strategy;
mod unwind;

pub use cove::Cove;
pub use execution::ExecutionRunner;
pub use export::{export_to_csv, export_to_json};
pub use sessions::{EstablishedSessions, FailedAssumeRole, SessionEstablisher};
pub use strategy::{PooledRunner, Runner, RunnerStrategy, SequentialRunner, StreamingRunner};
