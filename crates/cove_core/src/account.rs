use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Length of every organization member account identifier.
pub const ACCOUNT_ID_LENGTH: usize = 12;

/// Identifier of one member account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build an identifier, rejecting values that are not `ACCOUNT_ID_LENGTH` characters long.
    pub fn validated(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.chars().count() != ACCOUNT_ID_LENGTH {
            return Err(ValidationError::account_id_length(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Accounts targeted by one run. Computed before any concurrency starts.
pub type TargetSet = BTreeSet<AccountId>;

/// Validated set of accounts excluded from a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet(BTreeSet<AccountId>);

impl IgnoreSet {
    /// Validate every entry before accepting any of them.
    pub fn parse<S: AsRef<str>>(ids: &[S]) -> Result<Self, ValidationError> {
        let validated = ids
            .iter()
            .map(|id| AccountId::validated(id.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(validated))
    }

    pub fn contains(&self, account_id: &AccountId) -> bool {
        self.0.contains(account_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountId> {
        self.0.iter()
    }
}

/// Lifecycle state reported by the account directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountStatus {
    Active,
    Suspended,
    PendingClosure,
    Other(String),
}

impl AccountStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ACTIVE" => Self::Active,
            "SUSPENDED" => Self::Suspended,
            "PENDING_CLOSURE" => Self::PendingClosure,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::PendingClosure => "PENDING_CLOSURE",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for AccountStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AccountStatus> for String {
    fn from(value: AccountStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory entry for one member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountMetadata {
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

impl AccountMetadata {
    /// Metadata carrying only the identifier, used when no directory lookup happened.
    pub fn bare(id: AccountId) -> Self {
        Self {
            id,
            arn: None,
            email: None,
            name: None,
            status: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(AccountStatus::Active)
    }
}

/// ARN of `role_name` inside `account_id`.
pub fn role_arn(partition: &str, account_id: &AccountId, role_name: &str) -> String {
    format!("arn:{partition}:iam::{account_id}:role/{role_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_set_rejects_wrong_length_entries() {
        let error = IgnoreSet::parse(&["111111111111", "12345"]).expect_err("short id should fail");
        assert_eq!(error.value(), "12345");
        assert_eq!(
            error.to_string(),
            "All ignore ids must be 12 character strings, got '12345'"
        );
    }

    #[test]
    fn ignore_set_deduplicates_entries() {
        let ignore =
            IgnoreSet::parse(&["111111111111", "111111111111"]).expect("ids should validate");
        assert_eq!(ignore.len(), 1);
        assert!(ignore.contains(&AccountId::from("111111111111")));
    }

    #[test]
    fn account_status_round_trips_unknown_values() {
        assert_eq!(AccountStatus::parse("ACTIVE"), AccountStatus::Active);
        let status = AccountStatus::parse("CLOSED");
        assert_eq!(status, AccountStatus::Other("CLOSED".to_string()));
        assert_eq!(status.as_str(), "CLOSED");
    }

    #[test]
    fn metadata_serializes_with_pascal_case_keys() {
        let metadata = AccountMetadata {
            status: Some(AccountStatus::Active),
            name: Some("sandbox".to_string()),
            ..AccountMetadata::bare(AccountId::from("111111111111"))
        };

        let value = serde_json::to_value(&metadata).expect("metadata should serialize");
        assert_eq!(value["Id"], "111111111111");
        assert_eq!(value["Status"], "ACTIVE");
        assert_eq!(value["Name"], "sandbox");
        assert!(value.get("Email").is_none());
    }

    #[test]
    fn role_arn_uses_partition_and_role_name() {
        let arn = role_arn(
            "aws-us-gov",
            &AccountId::from("111111111111"),
            "OrganizationAccountAccessRole",
        );
        assert_eq!(
            arn,
            "arn:aws-us-gov:iam::111111111111:role/OrganizationAccountAccessRole"
        );
    }
}
