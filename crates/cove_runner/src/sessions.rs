use cove_core::config::DEFAULT_PARTITION;
use cove_core::{
    role_arn, AccountDetails, AccountDirectory, AccountId, AccountMetadata, AccountSession,
    AccountSessionRecord, CredentialIssuer, ErrorDetail, ServiceError, TargetSet,
};
use tracing::{debug, info, warn};

use crate::strategy::RunnerStrategy;
use crate::unwind::catch_panic;

const STAGE_LABEL: &str = "Assuming sessions";

/// An account whose role could not be assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAssumeRole {
    pub details: AccountDetails,
    pub error: ErrorDetail,
}

impl FailedAssumeRole {
    pub fn into_record<R>(self) -> AccountSessionRecord<R> {
        self.details.into_failed_assume_role(self.error)
    }
}

/// Result of the credential stage. `valid.len() + failed.len()` equals the target count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstablishedSessions {
    pub valid: Vec<AccountSession>,
    pub failed: Vec<FailedAssumeRole>,
}

impl EstablishedSessions {
    pub fn total(&self) -> usize {
        self.valid.len() + self.failed.len()
    }

    pub fn failed_records<R>(self) -> (Vec<AccountSession>, Vec<AccountSessionRecord<R>>) {
        let failed = self
            .failed
            .into_iter()
            .map(FailedAssumeRole::into_record)
            .collect();
        (self.valid, failed)
    }
}

enum SessionOutcome {
    Established(AccountSession),
    Failed(FailedAssumeRole),
}

/// Assumes the configured role in every target account concurrently.
///
/// Failures are captured per account and never abort the stage.
pub struct SessionEstablisher<'a, S> {
    directory: &'a dyn AccountDirectory,
    issuer: &'a dyn CredentialIssuer,
    strategy: &'a S,
    partition: &'a str,
}

impl<'a, S: RunnerStrategy> SessionEstablisher<'a, S> {
    pub fn new(
        directory: &'a dyn AccountDirectory,
        issuer: &'a dyn CredentialIssuer,
        strategy: &'a S,
    ) -> Self {
        Self {
            directory,
            issuer,
            strategy,
            partition: DEFAULT_PARTITION,
        }
    }

    pub fn with_partition(mut self, partition: &'a str) -> Self {
        self.partition = partition;
        self
    }

    pub fn establish(
        &self,
        targets: &TargetSet,
        role_name: &str,
        role_session_name: &str,
        enrich_from_directory: bool,
    ) -> EstablishedSessions {
        info!(
            targets = targets.len(),
            role_name,
            runner = self.strategy.name(),
            "Assuming role in target accounts"
        );

        let outcomes = self.strategy.map(
            STAGE_LABEL,
            targets.iter().cloned().collect(),
            |account_id| {
                self.establish_one(account_id, role_name, role_session_name, enrich_from_directory)
            },
        );

        let mut sessions = EstablishedSessions::default();
        for outcome in outcomes {
            match outcome {
                SessionOutcome::Established(session) => sessions.valid.push(session),
                SessionOutcome::Failed(failure) => sessions.failed.push(failure),
            }
        }

        if !sessions.failed.is_empty() {
            let failed_ids: Vec<&str> = sessions
                .failed
                .iter()
                .map(|failure| failure.details.id().as_str())
                .collect();
            warn!(
                failed = sessions.failed.len(),
                accounts = ?failed_ids,
                "Could not assume role in some accounts"
            );
        }
        sessions
    }

    fn establish_one(
        &self,
        account_id: AccountId,
        role_name: &str,
        role_session_name: &str,
        enrich_from_directory: bool,
    ) -> SessionOutcome {
        let metadata = if enrich_from_directory {
            self.describe(account_id)
        } else {
            AccountMetadata::bare(account_id)
        };
        let details = AccountDetails::new(metadata, role_session_name);
        let arn = role_arn(self.partition, details.id(), role_name);

        let assumed = catch_panic(|| {
            self.issuer
                .assume_role(details.id(), &arn, details.role_session_name())
        })
        .unwrap_or_else(|message| {
            Err(ServiceError::new(
                None,
                format!("assume role panicked: {message}"),
            ))
        });

        match assumed {
            Ok(credentials) => {
                debug!(account_id = %details.id(), role_arn = %arn, "Assumed role");
                SessionOutcome::Established(details.into_session(arn, credentials))
            }
            Err(error) => {
                warn!(account_id = %details.id(), role_arn = %arn, %error, "Failed to assume role");
                SessionOutcome::Failed(FailedAssumeRole {
                    error: ErrorDetail::assume_role(&error),
                    details,
                })
            }
        }
    }

    /// Directory metadata for `account_id`; any lookup problem degrades to bare metadata.
    fn describe(&self, account_id: AccountId) -> AccountMetadata {
        match catch_panic(|| self.directory.describe_account(&account_id)) {
            Ok(Ok(metadata)) if metadata.id == account_id => metadata,
            Ok(Ok(metadata)) => {
                warn!(
                    %account_id,
                    described = %metadata.id,
                    "Directory described a different account, continuing without metadata"
                );
                AccountMetadata::bare(account_id)
            }
            Ok(Err(error)) => {
                warn!(%account_id, %error, "Failed to describe account, continuing without metadata");
                AccountMetadata::bare(account_id)
            }
            Err(message) => {
                warn!(%account_id, %message, "Account lookup panicked, continuing without metadata");
                AccountMetadata::bare(account_id)
            }
        }
    }
}
