//! Per-account session values.
//!
//! A record moves through three sealed stages and is never mutated in place:
//! [`AccountDetails`] (identity, before credentials are requested), then
//! [`AccountSession`] (credentials obtained), then [`AccountSessionRecord`]
//! (terminal outcome placed into the run output).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountMetadata, AccountStatus};
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    AssumeRole,
    Operation,
}

/// A captured failure, stored on the record rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl ErrorDetail {
    pub fn assume_role(error: &ServiceError) -> Self {
        Self {
            kind: ErrorKind::AssumeRole,
            code: error.code.clone(),
            message: error.message.clone(),
        }
    }

    pub fn operation(error: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Operation,
            code: None,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Temporary credentials scoped to one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Identity of one target account before credentials are requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    metadata: AccountMetadata,
    role_session_name: String,
}

impl AccountDetails {
    pub fn new(metadata: AccountMetadata, role_session_name: impl Into<String>) -> Self {
        Self {
            metadata,
            role_session_name: role_session_name.into(),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &AccountMetadata {
        &self.metadata
    }

    pub fn role_session_name(&self) -> &str {
        &self.role_session_name
    }

    pub fn into_session(self, role_arn: impl Into<String>, credentials: Credentials) -> AccountSession {
        AccountSession {
            details: self,
            role_arn: role_arn.into(),
            credentials,
        }
    }

    pub fn into_failed_assume_role<R>(self, error: ErrorDetail) -> AccountSessionRecord<R> {
        AccountSessionRecord::seal(self, false, None, Some(vec![error]))
    }
}

/// A credentialed session in one account, handed to the caller's operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSession {
    details: AccountDetails,
    role_arn: String,
    credentials: Credentials,
}

impl AccountSession {
    pub fn id(&self) -> &AccountId {
        self.details.id()
    }

    pub fn metadata(&self) -> &AccountMetadata {
        self.details.metadata()
    }

    pub fn role_session_name(&self) -> &str {
        self.details.role_session_name()
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn into_succeeded<R>(self, result: R) -> AccountSessionRecord<R> {
        AccountSessionRecord::seal(self.details, true, Some(result), None)
    }

    pub fn into_failed<R>(self, error: ErrorDetail) -> AccountSessionRecord<R> {
        AccountSessionRecord::seal(self.details, true, None, Some(vec![error]))
    }
}

/// Terminal outcome for one account. Exactly one of `Result` and
/// `ExceptionDetails` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountSessionRecord<R> {
    id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<AccountStatus>,
    assume_role_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception_details: Option<Vec<ErrorDetail>>,
}

impl<R> AccountSessionRecord<R> {
    fn seal(
        details: AccountDetails,
        assume_role_success: bool,
        result: Option<R>,
        exception_details: Option<Vec<ErrorDetail>>,
    ) -> Self {
        let AccountDetails {
            metadata,
            role_session_name,
        } = details;
        Self {
            id: metadata.id,
            arn: metadata.arn,
            email: metadata.email,
            name: metadata.name,
            status: metadata.status,
            assume_role_success: Some(assume_role_success),
            role_session_name: Some(role_session_name),
            result,
            exception_details,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn arn(&self) -> Option<&str> {
        self.arn.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> Option<&AccountStatus> {
        self.status.as_ref()
    }

    pub fn assume_role_success(&self) -> Option<bool> {
        self.assume_role_success
    }

    pub fn role_session_name(&self) -> Option<&str> {
        self.role_session_name.as_deref()
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn exception_details(&self) -> Option<&[ErrorDetail]> {
        self.exception_details.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.exception_details.is_some()
    }
}
