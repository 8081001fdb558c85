//! Error shared by the storefront backend ports.

use serde::{Deserialize, Serialize};

/// Errors from storefront backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Error code for categorization.
    pub code: ServiceErrorCode,

    /// Human-readable message, safe to log.
    pub message: String,

    /// HTTP status, when one was received.
    pub status: Option<u16>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl ServiceError {
    pub fn new(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::Timeout, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::Unauthorized, message)
    }

    /// The backend understood the request and said no.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::Rejected, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::InvalidResponse, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorCode::ServerError, message)
    }

    /// True when the backend positively refused the credential.
    pub fn is_auth_failure(&self) -> bool {
        self.code == ServiceErrorCode::Unauthorized
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Service error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorCode {
    /// Connection refused, DNS failure, reset.
    NetworkError,

    /// No response within the configured timeout.
    Timeout,

    /// Credential missing, invalid, or expired.
    Unauthorized,

    /// Request refused by the backend (`success: false` or a 4xx).
    Rejected,

    /// Body did not match the expected envelope.
    InvalidResponse,

    /// 5xx from the backend.
    ServerError,
}

impl ServiceErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceErrorCode::NetworkError | ServiceErrorCode::Timeout | ServiceErrorCode::ServerError
        )
    }
}

impl std::fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceErrorCode::NetworkError => "network_error",
            ServiceErrorCode::Timeout => "timeout",
            ServiceErrorCode::Unauthorized => "unauthorized",
            ServiceErrorCode::Rejected => "rejected",
            ServiceErrorCode::InvalidResponse => "invalid_response",
            ServiceErrorCode::ServerError => "server_error",
        };
        write!(f, "{}", s)
    }
}
