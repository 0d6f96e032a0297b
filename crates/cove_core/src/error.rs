use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{AccountId, ACCOUNT_ID_LENGTH};
use crate::record::ErrorDetail;

/// An ignore-list entry that is not a well-formed account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("All ignore ids must be {expected} character strings, got '{value}'")]
pub struct ValidationError {
    value: String,
    expected: usize,
}

impl ValidationError {
    pub fn account_id_length(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected: ACCOUNT_ID_LENGTH,
        }
    }

    /// The rejected entry, as given by the caller.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Error raised by an external directory or credential collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: Option<String>,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Some(code.into()), message)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Run-level failures. Per-account failures are carried as data on records instead.
#[derive(Debug, Error)]
pub enum CoveError {
    #[error("Invalid ignore list: {0}")]
    Validation(#[from] ValidationError),

    #[error("There are no eligible account ids to run the operation against")]
    NoEligibleTargets,

    #[error("No accounts are accessible ({failed} failed to assume role): check logs for detail")]
    NoAccessibleAccounts { failed: usize },

    #[error("Failed to list organization accounts: {0}")]
    DirectoryListing(ServiceError),

    #[error("Failed to resolve the calling account: {0}")]
    CallerIdentity(ServiceError),

    #[error("Operation failed in account {account_id}: {error}")]
    OperationFailed {
        account_id: AccountId,
        error: ErrorDetail,
    },
}

pub type Result<T> = std::result::Result<T, CoveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display_includes_code() {
        let error = ServiceError::with_code("AccessDenied", "not authorized to perform sts:AssumeRole");
        assert_eq!(
            error.to_string(),
            "AccessDenied: not authorized to perform sts:AssumeRole"
        );
        assert_eq!(ServiceError::new(None, "timeout").to_string(), "timeout");
    }

    #[test]
    fn validation_error_converts_into_run_error() {
        let error: CoveError = ValidationError::account_id_length("bad id").into();
        assert!(matches!(error, CoveError::Validation(_)));
        assert_eq!(
            error.to_string(),
            "Invalid ignore list: All ignore ids must be 12 character strings, got 'bad id'"
        );
    }
}
