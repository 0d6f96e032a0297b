pub mod organizations;
pub mod sts;

use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata};
use cove_core::ServiceError;

/// Flatten an SDK error into the collaborator error, keeping the service error code.
pub(crate) fn service_error<E>(error: E) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let code = error.code().map(str::to_string);
    let message = match error.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&error).to_string(),
    };
    ServiceError::new(code, message)
}
