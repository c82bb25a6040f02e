//! Application-wide error classification.
//!
//! Every module defines its own `thiserror` enum with full context; this
//! module provides the shared taxonomy those errors classify into so callers
//! can decide uniformly whether to retry, fix their input, or give up.

use serde::Serialize;

/// Broad classification of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed validation before any state was touched.
    Validation,
    /// The operation is illegal in the subject's current state
    /// (closed period, wrong status, ineligible account).
    StateConflict,
    /// A referenced entity does not exist for the company.
    NotFound,
    /// A structural constraint blocks the operation (children, posted
    /// entries); the error lists the blockers.
    Integrity,
    /// An optimistic check lost against a concurrent writer; safe to retry
    /// with fresh state.
    ConcurrencyConflict,
    /// The storage layer failed.
    Storage,
}

impl ErrorKind {
    /// Returns true if retrying the operation with fresh state can succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }

    /// Returns the stable code used in API responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::StateConflict => "STATE_CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::Integrity => "INTEGRITY_ERROR",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Storage => "STORAGE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_concurrency_is_retryable() {
        assert!(ErrorKind::ConcurrencyConflict.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::StateConflict.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::Integrity.is_retryable());
        assert!(!ErrorKind::Storage.is_retryable());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorKind::Validation.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::StateConflict.as_str(), "STATE_CONFLICT");
        assert_eq!(ErrorKind::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorKind::Integrity.as_str(), "INTEGRITY_ERROR");
        assert_eq!(
            ErrorKind::ConcurrencyConflict.as_str(),
            "CONCURRENCY_CONFLICT"
        );
        assert_eq!(ErrorKind::Storage.as_str(), "STORAGE_ERROR");
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(ErrorKind::Integrity.to_string(), "INTEGRITY_ERROR");
    }
}
