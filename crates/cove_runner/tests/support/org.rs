#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use cove_core::{
    AccountDirectory, AccountId, AccountMetadata, AccountStatus, Credentials, CredentialIssuer,
    ServiceError,
};

/// In-memory organization standing in for both the directory and the credential service.
pub struct StubOrganization {
    caller: AccountId,
    accounts: Vec<AccountId>,
    deny_assume_role: BTreeSet<AccountId>,
    panic_on_assume_role: BTreeSet<AccountId>,
    describe_fails: bool,
    pub list_calls: AtomicUsize,
    pub describe_calls: AtomicUsize,
    pub assume_role_calls: AtomicUsize,
    pub caller_identity_calls: AtomicUsize,
}

impl StubOrganization {
    pub fn new(caller: &str) -> Self {
        Self {
            caller: AccountId::from(caller),
            accounts: vec![AccountId::from(caller)],
            deny_assume_role: BTreeSet::new(),
            panic_on_assume_role: BTreeSet::new(),
            describe_fails: false,
            list_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
            assume_role_calls: AtomicUsize::new(0),
            caller_identity_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_members(mut self, ids: &[&str]) -> Self {
        self.accounts.extend(ids.iter().map(|id| AccountId::from(*id)));
        self
    }

    pub fn denying_assume_role(mut self, ids: &[&str]) -> Self {
        self.deny_assume_role
            .extend(ids.iter().map(|id| AccountId::from(*id)));
        self
    }

    pub fn panicking_on_assume_role(mut self, ids: &[&str]) -> Self {
        self.panic_on_assume_role
            .extend(ids.iter().map(|id| AccountId::from(*id)));
        self
    }

    pub fn with_failing_describe(mut self) -> Self {
        self.describe_fails = true;
        self
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.describe_calls.load(Ordering::SeqCst)
            + self.assume_role_calls.load(Ordering::SeqCst)
            + self.caller_identity_calls.load(Ordering::SeqCst)
    }

    fn metadata(account_id: &AccountId) -> AccountMetadata {
        AccountMetadata {
            id: account_id.clone(),
            arn: Some(format!(
                "arn:aws:organizations::999999999999:account/o-example/{account_id}"
            )),
            email: Some(format!("aws+{account_id}@example.com")),
            name: Some(format!("member-{account_id}")),
            status: Some(AccountStatus::Active),
        }
    }
}

impl AccountDirectory for StubOrganization {
    fn list_active_accounts(&self) -> Result<Vec<AccountMetadata>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.iter().map(Self::metadata).collect())
    }

    fn describe_account(&self, account_id: &AccountId) -> Result<AccountMetadata, ServiceError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if self.describe_fails {
            return Err(ServiceError::with_code(
                "AccessDeniedException",
                "not authorized to perform organizations:DescribeAccount",
            ));
        }
        Ok(Self::metadata(account_id))
    }
}

impl CredentialIssuer for StubOrganization {
    fn assume_role(
        &self,
        account_id: &AccountId,
        role_arn: &str,
        _role_session_name: &str,
    ) -> Result<Credentials, ServiceError> {
        self.assume_role_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_assume_role.contains(account_id) {
            panic!("credential chain exploded for {account_id}");
        }
        if self.deny_assume_role.contains(account_id) {
            return Err(ServiceError::with_code(
                "AccessDenied",
                format!("not authorized to perform sts:AssumeRole on {role_arn}"),
            ));
        }
        Ok(Credentials {
            access_key_id: format!("ASIA{account_id}"),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            expiration: None,
        })
    }

    fn caller_account_id(&self) -> Result<AccountId, ServiceError> {
        self.caller_identity_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.caller.clone())
    }
}
