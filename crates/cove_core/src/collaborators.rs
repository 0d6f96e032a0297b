use std::sync::Arc;

use crate::account::{AccountId, AccountMetadata};
use crate::error::ServiceError;
use crate::record::Credentials;

/// Organization account listing. Implementations are shared across pool workers.
pub trait AccountDirectory: Send + Sync {
    /// Every account of the organization currently in the active lifecycle state.
    fn list_active_accounts(&self) -> Result<Vec<AccountMetadata>, ServiceError>;

    fn describe_account(&self, account_id: &AccountId) -> Result<AccountMetadata, ServiceError>;
}

/// Role assumption against the caller's base credentials.
pub trait CredentialIssuer: Send + Sync {
    fn assume_role(
        &self,
        account_id: &AccountId,
        role_arn: &str,
        role_session_name: &str,
    ) -> Result<Credentials, ServiceError>;

    /// Account holding the base credentials; never targeted by auto-discovery.
    fn caller_account_id(&self) -> Result<AccountId, ServiceError>;
}

impl<T: AccountDirectory + ?Sized> AccountDirectory for Arc<T> {
    fn list_active_accounts(&self) -> Result<Vec<AccountMetadata>, ServiceError> {
        (**self).list_active_accounts()
    }

    fn describe_account(&self, account_id: &AccountId) -> Result<AccountMetadata, ServiceError> {
        (**self).describe_account(account_id)
    }
}

impl<T: CredentialIssuer + ?Sized> CredentialIssuer for Arc<T> {
    fn assume_role(
        &self,
        account_id: &AccountId,
        role_arn: &str,
        role_session_name: &str,
    ) -> Result<Credentials, ServiceError> {
        (**self).assume_role(account_id, role_arn, role_session_name)
    }

    fn caller_account_id(&self) -> Result<AccountId, ServiceError> {
        (**self).caller_account_id()
    }
}
