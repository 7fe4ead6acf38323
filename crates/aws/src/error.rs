//! Translation of SDK errors into skiff errors
//!
//! Service errors keep the machine-readable code the service reported. When
//! the response has no error body (HEAD requests), the HTTP status code is
//! used as the code instead.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use skiff_core::Error;

/// Convert an SDK error from any AWS service client
pub(crate) fn from_sdk_error<E>(err: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(context) => {
            let code = context
                .err()
                .code()
                .map(str::to_string)
                .unwrap_or_else(|| context.raw().status().as_u16().to_string());
            let message = context
                .err()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            Error::Service { code, message }
        }
        _ => Error::Network(DisplayErrorContext(&err).to_string()),
    }
}
