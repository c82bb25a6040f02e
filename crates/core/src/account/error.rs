//! Account validation error types.

use thiserror::Error;
use uuid::Uuid;

use kassa_shared::ErrorKind;

use super::types::{AccountNature, AccountType};

/// Errors raised by pure account validation and tree math.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account code is empty.
    #[error("Account code must not be empty")]
    EmptyCode,

    /// Account code exceeds the maximum length.
    #[error("Account code '{code}' exceeds maximum length of {max} characters")]
    CodeTooLong {
        /// The offending code.
        code: String,
        /// Maximum allowed length.
        max: usize,
    },

    /// Account code contains characters outside `A-Z`, `0-9`, `.` and `-`.
    #[error("Account code '{0}' contains invalid characters")]
    InvalidCodeFormat(String),

    /// Nature does not match the default for the account type.
    #[error("Nature {nature} does not match the default for {account_type} accounts")]
    NatureMismatch {
        /// The account type.
        account_type: AccountType,
        /// The requested nature.
        nature: AccountNature,
    },

    /// Moving an account under itself or one of its own descendants.
    #[error("Cannot move account {0} under itself or one of its descendants")]
    MoveIntoSubtree(Uuid),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCode => "EMPTY_CODE",
            Self::CodeTooLong { .. } => "CODE_TOO_LONG",
            Self::InvalidCodeFormat(_) => "INVALID_CODE_FORMAT",
            Self::NatureMismatch { .. } => "NATURE_MISMATCH",
            Self::MoveIntoSubtree(_) => "MOVE_INTO_SUBTREE",
        }
    }

    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCode
            | Self::CodeTooLong { .. }
            | Self::InvalidCodeFormat(_)
            | Self::NatureMismatch { .. } => ErrorKind::Validation,
            Self::MoveIntoSubtree(_) => ErrorKind::StateConflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AccountError::EmptyCode.kind(), ErrorKind::Validation);
        assert_eq!(
            AccountError::MoveIntoSubtree(Uuid::nil()).kind(),
            ErrorKind::StateConflict
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AccountError::InvalidCodeFormat("a b".into()).error_code(),
            "INVALID_CODE_FORMAT"
        );
        assert_eq!(
            AccountError::NatureMismatch {
                account_type: AccountType::Asset,
                nature: AccountNature::Credit,
            }
            .error_code(),
            "NATURE_MISMATCH"
        );
    }
}
