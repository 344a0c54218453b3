//! Error taxonomy for store and service operations.

use serde::Serialize;

/// Stable error codes for programmatic handling by the request layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    DuplicateEmail,
    InvalidCredentials,
    InvalidSession,
    NotFound,
    StorageError,
}

/// Errors surfaced by the core.
///
/// Two variants deliberately carry no distinguishing detail:
/// `InvalidCredentials` is identical for an unknown email and a wrong
/// password, and `NotFound` is identical for a missing task and a task owned
/// by someone else.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired session")]
    InvalidSession,

    #[error("task not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::ValidationError,
            Error::DuplicateEmail => ErrorCode::DuplicateEmail,
            Error::InvalidCredentials => ErrorCode::InvalidCredentials,
            Error::InvalidSession => ErrorCode::InvalidSession,
            Error::NotFound => ErrorCode::NotFound,
            Error::Storage(_) | Error::Migration(_) => ErrorCode::StorageError,
        }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Error::Validation(format!("{field}: {reason}"))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(
            Error::Validation("x".into()).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(Error::DuplicateEmail.code(), ErrorCode::DuplicateEmail);
        assert_eq!(Error::NotFound.code(), ErrorCode::NotFound);
        assert_eq!(
            Error::InvalidSession.code(),
            ErrorCode::InvalidSession
        );
    }

    #[test]
    fn credential_error_does_not_name_the_failing_half() {
        let msg = Error::InvalidCredentials.to_string();
        assert!(!msg.contains("email not"));
        assert!(!msg.contains("wrong password"));
    }
}
