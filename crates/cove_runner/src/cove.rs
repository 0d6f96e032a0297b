use std::fmt::{Debug, Display};
use std::sync::Arc;

use cove_core::{
    AccountDirectory, AccountSession, AccountSetResolver, CoveConfig, CoveError, CoveOutput,
    CredentialIssuer, Result, TargetSet,
};
use tracing::{info, warn};

use crate::execution::ExecutionRunner;
use crate::sessions::SessionEstablisher;
use crate::strategy::Runner;

/// Fan-out engine: resolve targets, assume a role in each, run one operation
/// per session and partition the outcomes.
pub struct Cove {
    config: CoveConfig,
    directory: Arc<dyn AccountDirectory>,
    issuer: Arc<dyn CredentialIssuer>,
}

impl Cove {
    pub fn new(
        config: CoveConfig,
        directory: Arc<dyn AccountDirectory>,
        issuer: Arc<dyn CredentialIssuer>,
    ) -> Self {
        Self {
            config,
            directory,
            issuer,
        }
    }

    /// Target set this engine would run against, without assuming any role.
    pub fn resolve_targets(&self) -> Result<TargetSet> {
        AccountSetResolver::new(self.directory.as_ref(), self.issuer.as_ref()).resolve(
            self.config.target_ids.as_deref(),
            self.config.ignore_ids.as_deref(),
            self.config.target_ids.is_none(),
        )
    }

    /// Run `operation` in every resolved account.
    ///
    /// Every target account appears in exactly one of the three output
    /// sequences. Run-level failures (invalid ignore list, nothing to target,
    /// no accessible account, fail-fast abort) are returned as `Err`.
    pub fn run<R, E, F>(&self, operation: F) -> Result<CoveOutput<R>>
    where
        R: Send + Debug,
        E: Display,
        F: Fn(&AccountSession) -> std::result::Result<R, E> + Sync,
    {
        let targets = self.resolve_targets()?;

        let role_name = self.config.resolved_role_name();
        let session_strategy = Runner::from_kind(
            self.config.runner,
            self.config.session_workers,
            self.config.show_progress,
        );
        let sessions = SessionEstablisher::new(
            self.directory.as_ref(),
            self.issuer.as_ref(),
            &session_strategy,
        )
        .with_partition(&self.config.partition)
        .establish(
            &targets,
            role_name,
            self.config.resolved_role_session_name(),
            self.config.org_master,
        );

        if sessions.valid.is_empty() {
            warn!(
                targets = targets.len(),
                role_name,
                "Could not assume role in any target account"
            );
            return Err(CoveError::NoAccessibleAccounts {
                failed: sessions.failed.len(),
            });
        }

        let (valid, failed_assume_role) = sessions.failed_records();
        let operation_strategy = Runner::from_kind(
            self.config.runner,
            self.config.operation_workers,
            self.config.show_progress,
        );
        let outcome = ExecutionRunner::new(&operation_strategy)
            .with_raise_on_operation_error(self.config.raise_exception)
            .run(valid, &operation)?;

        let output = CoveOutput::assemble(failed_assume_role, outcome);
        info!(
            results = output.results.len(),
            exceptions = output.exceptions.len(),
            failed_assume_role = output.failed_assume_role.len(),
            "Completed run"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use cove_core::{AccountId, AccountMetadata, Credentials, ServiceError};

    use super::*;

    struct FixedDirectory;

    impl AccountDirectory for FixedDirectory {
        fn list_active_accounts(&self) -> std::result::Result<Vec<AccountMetadata>, ServiceError> {
            Ok(["111111111111", "222222222222", "999999999999"]
                .into_iter()
                .map(|id| AccountMetadata::bare(AccountId::from(id)))
                .collect())
        }

        fn describe_account(
            &self,
            account_id: &AccountId,
        ) -> std::result::Result<AccountMetadata, ServiceError> {
            Ok(AccountMetadata::bare(account_id.clone()))
        }
    }

    struct AllowingIssuer;

    impl CredentialIssuer for AllowingIssuer {
        fn assume_role(
            &self,
            _account_id: &AccountId,
            _role_arn: &str,
            _role_session_name: &str,
        ) -> std::result::Result<Credentials, ServiceError> {
            Ok(Credentials {
                access_key_id: "a".to_string(),
                secret_access_key: "s".to_string(),
                session_token: "t".to_string(),
                expiration: None,
            })
        }

        fn caller_account_id(&self) -> std::result::Result<AccountId, ServiceError> {
            Ok(AccountId::from("999999999999"))
        }
    }

    fn cove(config: CoveConfig) -> Cove {
        Cove::new(config, Arc::new(FixedDirectory), Arc::new(AllowingIssuer))
    }

    #[test]
    fn discovery_skips_the_calling_account() {
        let targets = cove(CoveConfig::default())
            .resolve_targets()
            .expect("targets resolve");
        let ids: Vec<&str> = targets.iter().map(AccountId::as_str).collect();
        assert_eq!(ids, vec!["111111111111", "222222222222"]);
    }

    #[test]
    fn run_produces_one_result_per_target() {
        let output = cove(CoveConfig::default().with_workers(2, 2))
            .run(|session| Ok::<_, String>(session.role_arn().to_string()))
            .expect("run succeeds");

        assert_eq!(output.results.len(), 2);
        assert!(output.exceptions.is_empty());
        assert!(output.failed_assume_role.is_empty());
        assert!(output
            .results
            .iter()
            .all(|record| record.result().is_some_and(|arn| arn.ends_with(
                ":role/OrganizationAccountAccessRole"
            ))));
    }
}
