//! Failure kinds surfaced by the ledger core
//!
//! Every caller-facing failure is non-retriable: it describes a problem with
//! the request or with the current state, never a transient condition. The
//! only exception is `Storage`, which wraps backend failures.

use axum::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Authorization or ownership failure
    #[error("{0}")]
    PermissionDenied(String),

    /// State-machine violation (wrong proof status, duplicate skill, foreign edit)
    #[error("{0}")]
    Conflict(String),

    /// Request content that can never succeed (indivisible amount, empty set)
    #[error("{0}")]
    InvalidArgument(String),

    /// Path/body identifiers that do not agree with each other
    #[error("{0}")]
    BadRequest(String),

    /// No principal, or a token that resolves to nobody
    #[error("{0}")]
    AuthenticationRequired(String),

    /// Backend failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Short machine-readable kind, used in API responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "not_found",
            LedgerError::PermissionDenied(_) => "permission_denied",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::InvalidArgument(_) => "invalid_argument",
            LedgerError::BadRequest(_) => "bad_request",
            LedgerError::AuthenticationRequired(_) => "authentication_required",
            LedgerError::Storage(_) => "storage",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::InvalidArgument(_) | LedgerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LedgerError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}
