use aws_config::SdkConfig;
use aws_sdk_organizations::operation::list_accounts::ListAccountsOutput;
use aws_sdk_organizations::types::Account;
use aws_sdk_organizations::Client;
use cove_core::{AccountDirectory, AccountId, AccountMetadata, AccountStatus, ServiceError};
use tokio::runtime::Handle;
use tracing::debug;

use super::service_error;

/// AWS Organizations as the account directory.
#[derive(Clone)]
pub struct OrganizationsDirectory {
    client: Client,
    runtime: Handle,
}

impl OrganizationsDirectory {
    pub fn new(client: Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    pub fn from_config(config: &SdkConfig, runtime: Handle) -> Self {
        Self::new(Client::new(config), runtime)
    }
}

impl AccountDirectory for OrganizationsDirectory {
    fn list_active_accounts(&self) -> Result<Vec<AccountMetadata>, ServiceError> {
        let client = self.client.clone();
        let pages = self.runtime.block_on(async move {
            client
                .list_accounts()
                .into_paginator()
                .send()
                .collect::<Result<Vec<_>, _>>()
                .await
                .map_err(service_error)
        })?;

        Ok(active_accounts(&pages))
    }

    fn describe_account(&self, account_id: &AccountId) -> Result<AccountMetadata, ServiceError> {
        let client = self.client.clone();
        let id = account_id.to_string();
        let output = self.runtime.block_on(async move {
            client
                .describe_account()
                .account_id(id)
                .send()
                .await
                .map_err(service_error)
        })?;

        output
            .account()
            .and_then(account_metadata)
            .ok_or_else(|| {
                ServiceError::new(
                    None,
                    format!("DescribeAccount returned no account for {account_id}"),
                )
            })
    }
}

fn active_accounts(pages: &[ListAccountsOutput]) -> Vec<AccountMetadata> {
    let accounts: Vec<&Account> = pages.iter().flat_map(|page| page.accounts()).collect();
    let listed = accounts.len();
    let active: Vec<AccountMetadata> = accounts
        .into_iter()
        .filter_map(account_metadata)
        .filter(AccountMetadata::is_active)
        .collect();
    debug!(pages = pages.len(), listed, active = active.len(), "Listed organization accounts");
    active
}

#[allow(deprecated)]
fn account_metadata(account: &Account) -> Option<AccountMetadata> {
    let id = account.id()?;
    Some(AccountMetadata {
        id: AccountId::from(id),
        arn: account.arn().map(str::to_string),
        email: account.email().map(str::to_string),
        name: account.name().map(str::to_string),
        status: account
            .status()
            .map(|status| AccountStatus::parse(status.as_str())),
    })
}
