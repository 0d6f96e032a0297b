use serde::Serialize;

use crate::account::AccountId;
use crate::record::AccountSessionRecord;

/// Records produced by running the operation against credentialed sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome<R> {
    pub succeeded: Vec<AccountSessionRecord<R>>,
    pub failed: Vec<AccountSessionRecord<R>>,
}

impl<R> ExecutionOutcome<R> {
    /// Split by presence of captured errors.
    pub fn from_records(records: Vec<AccountSessionRecord<R>>) -> Self {
        let (failed, succeeded) = records.into_iter().partition(|record| record.is_failure());
        Self { succeeded, failed }
    }
}

/// Final output of a run: every record created lands in exactly one sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoveOutput<R> {
    pub results: Vec<AccountSessionRecord<R>>,
    pub exceptions: Vec<AccountSessionRecord<R>>,
    pub failed_assume_role: Vec<AccountSessionRecord<R>>,
}

impl<R> CoveOutput<R> {
    pub fn assemble(
        failed_assume_role: Vec<AccountSessionRecord<R>>,
        outcome: ExecutionOutcome<R>,
    ) -> Self {
        Self {
            results: outcome.succeeded,
            exceptions: outcome.failed,
            failed_assume_role,
        }
    }

    /// Classify a flat list of terminal records.
    pub fn partition(records: impl IntoIterator<Item = AccountSessionRecord<R>>) -> Self {
        let mut output = Self {
            results: Vec::new(),
            exceptions: Vec::new(),
            failed_assume_role: Vec::new(),
        };
        for record in records {
            if record.assume_role_success() == Some(false) {
                output.failed_assume_role.push(record);
            } else if record.is_failure() {
                output.exceptions.push(record);
            } else {
                output.results.push(record);
            }
        }
        output
    }

    pub fn total(&self) -> usize {
        self.results.len() + self.exceptions.len() + self.failed_assume_role.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn account_ids(&self) -> Vec<&AccountId> {
        self.records().map(AccountSessionRecord::id).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &AccountSessionRecord<R>> {
        self.results
            .iter()
            .chain(self.exceptions.iter())
            .chain(self.failed_assume_role.iter())
    }
}

#[cfg(test)]
mod tests {
    use crate::account::{AccountId, AccountMetadata};
    use crate::error::ServiceError;
    use crate::record::{AccountDetails, Credentials, ErrorDetail};

    use super::*;

    fn details(id: &str) -> AccountDetails {
        AccountDetails::new(AccountMetadata::bare(AccountId::from(id)), "cove")
    }

    fn session_record(id: &str, fail: bool) -> AccountSessionRecord<u32> {
        let session = details(id).into_session(
            "arn",
            Credentials {
                access_key_id: "a".to_string(),
                secret_access_key: "s".to_string(),
                session_token: "t".to_string(),
                expiration: None,
            },
        );
        if fail {
            session.into_failed(ErrorDetail::operation("boom"))
        } else {
            session.into_succeeded(7)
        }
    }

    #[test]
    fn assemble_keeps_classes_disjoint() {
        let failed_assume_role = vec![details("333333333333")
            .into_failed_assume_role(ErrorDetail::assume_role(&ServiceError::new(None, "denied")))];
        let outcome = ExecutionOutcome::from_records(vec![
            session_record("111111111111", false),
            session_record("222222222222", true),
        ]);

        let output = CoveOutput::assemble(failed_assume_role, outcome);

        assert_eq!(output.total(), 3);
        assert_eq!(output.results[0].id().as_str(), "111111111111");
        assert_eq!(output.exceptions[0].id().as_str(), "222222222222");
        assert_eq!(output.failed_assume_role[0].id().as_str(), "333333333333");
    }

    #[test]
    fn partition_matches_assemble_classification() {
        let records = vec![
            session_record("111111111111", false),
            session_record("222222222222", true),
            details("333333333333")
                .into_failed_assume_role(ErrorDetail::assume_role(&ServiceError::new(None, "x"))),
        ];

        let output = CoveOutput::partition(records);

        assert_eq!(output.results.len(), 1);
        assert_eq!(output.exceptions.len(), 1);
        assert_eq!(output.failed_assume_role.len(), 1);
        assert_eq!(output.account_ids().len(), 3);
    }

    #[test]
    fn output_serializes_three_named_sequences() {
        let output = CoveOutput::partition(vec![session_record("111111111111", false)]);
        let value = serde_json::to_value(&output).expect("output should serialize");

        assert_eq!(value["Results"][0]["Result"], 7);
        assert_eq!(value["Exceptions"], serde_json::json!([]));
        assert_eq!(value["FailedAssumeRole"], serde_json::json!([]));
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct CallerArn(String);

    #[test]
    fn output_serializes_result_types_without_default() {
        let credentials = Credentials {
            access_key_id: "a".to_string(),
            secret_access_key: "s".to_string(),
            session_token: "t".to_string(),
            expiration: None,
        };
        let record = details("111111111111")
            .into_session("arn", credentials)
            .into_succeeded(CallerArn(
                "arn:aws:sts::111111111111:assumed-role/Audit/cove".to_string(),
            ));
        let output =
            CoveOutput::assemble(Vec::new(), ExecutionOutcome::from_records(vec![record]));

        let value = serde_json::to_value(&output).expect("output should serialize");
        assert_eq!(
            value["Results"][0]["Result"],
            "arn:aws:sts::111111111111:assumed-role/Audit/cove"
        );
    }
}
