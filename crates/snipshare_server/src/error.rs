//! Error types for the webhook server.

use snipshare_core::DomainError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the webhook server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The signing secret is not configured. Startup-time fatal.
    #[error("webhook signing secret is not configured")]
    ConfigMissing,

    /// The signing secret is present but unusable. Startup-time fatal.
    #[error("webhook signing secret is malformed: {0}")]
    ConfigInvalid(String),

    /// A required signing header is absent.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// The payload failed signature verification.
    #[error("webhook verification failed: {0}")]
    VerificationFailed(String),

    /// The request body is not a payload we can read.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The HTTP request itself is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// User synchronization failed; the provider should retry.
    #[error("user synchronization failed: {0}")]
    Sync(#[from] DomainError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Creates a verification failure.
    pub fn verification_failed(message: impl Into<String>) -> Self {
        Self::VerificationFailed(message.into())
    }

    /// Creates a malformed-payload error.
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::MissingHeader(_)
                | ServerError::VerificationFailed(_)
                | ServerError::MalformedPayload(_)
                | ServerError::InvalidRequest(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_are_client_errors() {
        assert_eq!(ServerError::MissingHeader("provider-id").status_code(), 400);
        assert_eq!(
            ServerError::verification_failed("signature mismatch").status_code(),
            400
        );
    }

    #[test]
    fn sync_failures_are_server_errors() {
        let err = ServerError::Sync(DomainError::save_failed("store offline"));
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn config_errors_are_server_class() {
        assert!(ServerError::ConfigMissing.is_server_error());
    }
}
