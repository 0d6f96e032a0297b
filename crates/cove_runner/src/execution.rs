use std::fmt::{Debug, Display};

use cove_core::{AccountSession, AccountSessionRecord, CoveError, ErrorDetail, ExecutionOutcome};
use tracing::{debug, error, info};

use crate::strategy::RunnerStrategy;
use crate::unwind::catch_panic;

const STAGE_LABEL: &str = "Executing function";

/// Invokes the caller's operation once per credentialed session.
pub struct ExecutionRunner<'a, S> {
    strategy: &'a S,
    raise_on_operation_error: bool,
}

impl<'a, S: RunnerStrategy> ExecutionRunner<'a, S> {
    pub fn new(strategy: &'a S) -> Self {
        Self {
            strategy,
            raise_on_operation_error: false,
        }
    }

    /// Abort the run on the first operation error instead of capturing it.
    pub fn with_raise_on_operation_error(mut self, raise: bool) -> Self {
        self.raise_on_operation_error = raise;
        self
    }

    /// Run `operation` against every session.
    ///
    /// Fail-soft (default): every session yields one record in the outcome.
    /// Fail-fast: the first operation error is logged with its record and
    /// returned as [`CoveError::OperationFailed`]; no partial outcome survives.
    pub fn run<R, E, F>(
        &self,
        sessions: Vec<AccountSession>,
        operation: &F,
    ) -> Result<ExecutionOutcome<R>, CoveError>
    where
        R: Send + Debug,
        E: Display,
        F: Fn(&AccountSession) -> Result<R, E> + Sync,
    {
        info!(
            sessions = sessions.len(),
            runner = self.strategy.name(),
            fail_fast = self.raise_on_operation_error,
            "Executing operation"
        );

        let raise = self.raise_on_operation_error;
        let records = self
            .strategy
            .try_map(STAGE_LABEL, sessions, |session| {
                let record = invoke(session, operation);
                if raise && record.is_failure() {
                    return Err(abort(record));
                }
                Ok(record)
            })?;

        Ok(ExecutionOutcome::from_records(records))
    }
}

fn invoke<R, E, F>(session: AccountSession, operation: &F) -> AccountSessionRecord<R>
where
    E: Display,
    F: Fn(&AccountSession) -> Result<R, E>,
{
    match catch_panic(|| operation(&session)) {
        Ok(Ok(result)) => {
            debug!(account_id = %session.id(), "Operation succeeded");
            session.into_succeeded(result)
        }
        Ok(Err(error)) => {
            debug!(account_id = %session.id(), %error, "Operation failed");
            session.into_failed(ErrorDetail::operation(error))
        }
        Err(message) => {
            debug!(account_id = %session.id(), %message, "Operation panicked");
            session.into_failed(ErrorDetail::operation(format!("operation panicked: {message}")))
        }
    }
}

fn abort<R: Debug>(record: AccountSessionRecord<R>) -> CoveError {
    error!(?record, "Operation failed with fail-fast enabled, aborting run");
    let account_id = record.id().clone();
    let detail = record
        .exception_details()
        .and_then(|details| details.first().cloned())
        .unwrap_or_else(|| ErrorDetail::operation("unknown failure"));
    CoveError::OperationFailed {
        account_id,
        error: detail,
    }
}

#[cfg(test)]
mod tests {
    use cove_core::{AccountDetails, AccountId, AccountMetadata, Credentials, ErrorKind};

    use super::*;
    use crate::strategy::{PooledRunner, SequentialRunner};

    fn session(id: &str) -> AccountSession {
        AccountDetails::new(AccountMetadata::bare(AccountId::from(id)), "cove").into_session(
            format!("arn:aws:iam::{id}:role/Audit"),
            Credentials {
                access_key_id: "a".to_string(),
                secret_access_key: "s".to_string(),
                session_token: "t".to_string(),
                expiration: None,
            },
        )
    }

    fn sessions(ids: &[&str]) -> Vec<AccountSession> {
        ids.iter().map(|id| session(id)).collect()
    }

    fn fail_on_two(session: &AccountSession) -> Result<String, String> {
        if session.id().as_str() == "222222222222" {
            Err("AccessDenied on s3:ListBuckets".to_string())
        } else {
            Ok(format!("ok:{}", session.id()))
        }
    }

    #[test]
    fn fail_soft_captures_errors_as_records() {
        let strategy = PooledRunner::new(4);
        let runner = ExecutionRunner::new(&strategy);

        let outcome = runner
            .run(
                sessions(&["111111111111", "222222222222", "333333333333"]),
                &fail_on_two,
            )
            .expect("fail-soft never aborts");

        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        let failure = &outcome.failed[0];
        assert_eq!(failure.id().as_str(), "222222222222");
        let details = failure.exception_details().expect("captured error");
        assert_eq!(details[0].kind, ErrorKind::Operation);
        assert_eq!(details[0].message, "AccessDenied on s3:ListBuckets");
    }

    #[test]
    fn fail_fast_aborts_with_operation_error() {
        let strategy = SequentialRunner::new();
        let runner = ExecutionRunner::new(&strategy).with_raise_on_operation_error(true);

        let error = runner
            .run(
                sessions(&["111111111111", "222222222222", "333333333333"]),
                &fail_on_two,
            )
            .expect_err("fail-fast should abort");

        match error {
            CoveError::OperationFailed { account_id, error } => {
                assert_eq!(account_id.as_str(), "222222222222");
                assert_eq!(error.message, "AccessDenied on s3:ListBuckets");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fail_fast_without_errors_returns_every_record() {
        let strategy = PooledRunner::new(2);
        let runner = ExecutionRunner::new(&strategy).with_raise_on_operation_error(true);

        let outcome = runner
            .run(sessions(&["111111111111", "333333333333"]), &fail_on_two)
            .expect("no operation fails");
        assert_eq!(outcome.succeeded.len(), 2);
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn panicking_operation_is_captured() {
        let strategy = SequentialRunner::new();
        let runner = ExecutionRunner::new(&strategy);

        let outcome = runner
            .run(sessions(&["111111111111"]), &|_: &AccountSession| -> Result<u8, String> {
                panic!("bucket policy missing")
            })
            .expect("panic is captured");

        let details = outcome.failed[0].exception_details().expect("captured panic");
        assert!(details[0].message.contains("bucket policy missing"));
    }
}
