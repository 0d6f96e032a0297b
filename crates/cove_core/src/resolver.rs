use tracing::{debug, info};

use crate::account::{AccountId, IgnoreSet, TargetSet};
use crate::collaborators::{AccountDirectory, CredentialIssuer};
use crate::error::{CoveError, Result};

/// Computes the frozen set of accounts a run targets.
pub struct AccountSetResolver<'a> {
    directory: &'a dyn AccountDirectory,
    issuer: &'a dyn CredentialIssuer,
}

impl<'a> AccountSetResolver<'a> {
    pub fn new(directory: &'a dyn AccountDirectory, issuer: &'a dyn CredentialIssuer) -> Self {
        Self { directory, issuer }
    }

    /// Resolve the target set.
    ///
    /// The ignore list is validated in full before any collaborator call.
    /// Explicit targets win over directory listing; auto-discovered targets
    /// never include the caller's own account.
    pub fn resolve(
        &self,
        explicit_targets: Option<&[AccountId]>,
        ignore_targets: Option<&[String]>,
        use_directory_listing: bool,
    ) -> Result<TargetSet> {
        let ignore = match ignore_targets {
            Some(ids) => IgnoreSet::parse(ids)?,
            None => IgnoreSet::default(),
        };

        let candidates = match explicit_targets {
            Some(ids) => ids.iter().cloned().collect(),
            None if use_directory_listing => self.discover_organization_targets()?,
            None => TargetSet::new(),
        };

        let targets: TargetSet = candidates
            .into_iter()
            .filter(|account_id| !ignore.contains(account_id))
            .collect();

        debug!(
            ignored = ?ignore.iter().map(AccountId::as_str).collect::<Vec<_>>(),
            "Ignore list"
        );
        info!(
            targets = targets.len(),
            ignored = ignore.len(),
            explicit = explicit_targets.is_some(),
            "Resolved target accounts"
        );

        if targets.is_empty() {
            return Err(CoveError::NoEligibleTargets);
        }
        Ok(targets)
    }

    fn discover_organization_targets(&self) -> Result<TargetSet> {
        let caller_account = self
            .issuer
            .caller_account_id()
            .map_err(CoveError::CallerIdentity)?;
        let accounts = self
            .directory
            .list_active_accounts()
            .map_err(CoveError::DirectoryListing)?;

        info!(
            caller_account = %caller_account,
            active_accounts = accounts.len(),
            "Discovered organization accounts"
        );

        Ok(accounts
            .into_iter()
            .map(|account| account.id)
            .filter(|account_id| *account_id != caller_account)
            .collect())
    }
}
