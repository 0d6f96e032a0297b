use aws_config::SdkConfig;
use aws_sdk_sts::Client;
use chrono::{DateTime, Utc};
use cove_core::{AccountId, CredentialIssuer, Credentials, ServiceError};
use tokio::runtime::Handle;

use super::service_error;

/// STS as the credential issuer. Base credentials are those of the `SdkConfig`
/// the client was built from.
#[derive(Clone)]
pub struct StsCredentialIssuer {
    client: Client,
    runtime: Handle,
}

impl StsCredentialIssuer {
    pub fn new(client: Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    pub fn from_config(config: &SdkConfig, runtime: Handle) -> Self {
        Self::new(Client::new(config), runtime)
    }
}

impl CredentialIssuer for StsCredentialIssuer {
    fn assume_role(
        &self,
        account_id: &AccountId,
        role_arn: &str,
        role_session_name: &str,
    ) -> Result<Credentials, ServiceError> {
        let client = self.client.clone();
        let arn = role_arn.to_string();
        let session_name = role_session_name.to_string();
        let output = self.runtime.block_on(async move {
            client
                .assume_role()
                .role_arn(arn)
                .role_session_name(session_name)
                .send()
                .await
                .map_err(service_error)
        })?;

        let credentials = output.credentials().ok_or_else(|| {
            ServiceError::new(None, format!("AssumeRole returned no credentials for {account_id}"))
        })?;
        let expiration = credentials.expiration();

        Ok(Credentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration: to_utc(expiration.secs(), expiration.subsec_nanos()),
        })
    }

    fn caller_account_id(&self) -> Result<AccountId, ServiceError> {
        let client = self.client.clone();
        let output = self.runtime.block_on(async move {
            client
                .get_caller_identity()
                .send()
                .await
                .map_err(service_error)
        })?;

        output
            .account()
            .map(AccountId::from)
            .ok_or_else(|| ServiceError::new(None, "GetCallerIdentity returned no account"))
    }
}

fn to_utc(secs: i64, subsec_nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, subsec_nanos)
}
