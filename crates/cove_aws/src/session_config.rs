use std::time::SystemTime;

use aws_config::SdkConfig;
use aws_sdk_sts::config::{Credentials as SdkCredentials, SharedCredentialsProvider};
use cove_core::AccountSession;

const PROVIDER_NAME: &str = "cove-assumed-role";

/// SDK configuration that signs requests with the session's temporary
/// credentials. Region and every other setting come from `base`.
pub fn session_sdk_config(session: &AccountSession, base: &SdkConfig) -> SdkConfig {
    let credentials = session.credentials();
    let provider = SdkCredentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        Some(credentials.session_token.clone()),
        credentials.expiration.map(SystemTime::from),
        PROVIDER_NAME,
    );

    base.to_builder()
        .credentials_provider(SharedCredentialsProvider::new(provider))
        .build()
}

#[cfg(test)]
mod tests {
    use aws_config::BehaviorVersion;
    use cove_core::{AccountDetails, AccountId, AccountMetadata, Credentials};

    use super::*;

    #[test]
    fn session_config_carries_session_credentials() {
        let session = AccountDetails::new(AccountMetadata::bare(AccountId::from("111111111111")), "cove")
            .into_session(
                "arn:aws:iam::111111111111:role/Audit",
                Credentials {
                    access_key_id: "ASIASESSION".to_string(),
                    secret_access_key: "secret".to_string(),
                    session_token: "token".to_string(),
                    expiration: None,
                },
            );
        let base = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();

        let config = session_sdk_config(&session, &base);

        assert!(config.credentials_provider().is_some());
        assert!(base.credentials_provider().is_none());
    }
}
