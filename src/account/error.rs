use thiserror::Error;

use crate::store::StoreError;

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Failures reported by the account service.
///
/// Every variant is recoverable: callers surface the message and may retry
/// by re-invoking the same operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    /// Registration with an identifier that already has an account.
    #[error("Email {0} is already registered")]
    DuplicateIdentifier(String),

    /// No account matches the identifier + secret pair.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Lookup or update of an identifier with no account.
    #[error("No account found for {0}")]
    NotFound(String),

    /// A required field was empty or whitespace.
    #[error("{0} must not be blank")]
    MissingField(&'static str),

    /// The record store raised an unexpected fault.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// The background task running the operation panicked or was cancelled.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl AccountError {
    /// Short machine-readable tag, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound(_) => "not_found",
            Self::MissingField(_) => "missing_field",
            Self::StorageFailure(_) => "storage_failure",
            Self::TaskFailed(_) => "task_failed",
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { identifier } => Self::DuplicateIdentifier(identifier),
            other => Self::StorageFailure(other.to_string()),
        }
    }
}
