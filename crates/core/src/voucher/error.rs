//! Voucher error types for lifecycle and validation failures.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use kassa_shared::ErrorKind;

use super::types::VoucherStatus;

/// Errors that can occur during voucher operations.
#[derive(Debug, Error)]
pub enum VoucherError {
    // ========== Validation Errors ==========
    /// Voucher has no entry lines.
    #[error("Voucher must have at least one entry")]
    NoEntries,

    /// Voucher debits and credits do not match.
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Entry has both debit and credit set.
    #[error("Entry {line_no} must set exactly one of debit or credit, not both")]
    BothSidesSet {
        /// 1-indexed line number.
        line_no: usize,
    },

    /// Entry has neither debit nor credit set.
    #[error("Entry {line_no} must set a positive debit or credit amount")]
    NoSideSet {
        /// 1-indexed line number.
        line_no: usize,
    },

    /// Entry amount is negative.
    #[error("Entry {line_no} amount must not be negative")]
    NegativeAmount {
        /// 1-indexed line number.
        line_no: usize,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    // ========== Account Eligibility Errors ==========
    /// Referenced account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account is a control account and only aggregates children.
    #[error("Account {0} is a control account and cannot receive direct postings")]
    ControlAccountPosting(Uuid),

    /// Account does not allow direct posting.
    #[error("Account {0} does not allow direct posting")]
    AccountNoDirectPosting(Uuid),

    // ========== State Errors ==========
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: VoucherStatus,
        /// The attempted target status.
        to: VoucherStatus,
    },

    /// Only posted vouchers can be reversed.
    #[error("Voucher {0} is not posted and cannot be reversed")]
    NotReversible(Uuid),

    /// Voucher has already been reversed.
    #[error("Voucher {original} has already been reversed by {reversal}")]
    AlreadyReversed {
        /// The original voucher.
        original: Uuid,
        /// The reversal that already exists.
        reversal: Uuid,
    },
}

impl VoucherError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoEntries => "NO_ENTRIES",
            Self::Unbalanced { .. } => "UNBALANCED_VOUCHER",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::NoSideSet { .. } => "NO_SIDE_SET",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::ControlAccountPosting(_) => "CONTROL_ACCOUNT_POSTING",
            Self::AccountNoDirectPosting(_) => "ACCOUNT_NO_DIRECT_POSTING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotReversible(_) => "NOT_REVERSIBLE",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
        }
    }

    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoEntries
            | Self::Unbalanced { .. }
            | Self::BothSidesSet { .. }
            | Self::NoSideSet { .. }
            | Self::NegativeAmount { .. }
            | Self::RejectionReasonRequired => ErrorKind::Validation,

            Self::AccountNotFound(_) => ErrorKind::NotFound,

            Self::AccountInactive(_)
            | Self::ControlAccountPosting(_)
            | Self::AccountNoDirectPosting(_)
            | Self::InvalidTransition { .. }
            | Self::NotReversible(_)
            | Self::AlreadyReversed { .. } => ErrorKind::StateConflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unbalanced_display() {
        let err = VoucherError::Unbalanced {
            debit: dec!(500.00),
            credit: dec!(300.00),
        };
        assert_eq!(
            err.to_string(),
            "Voucher is not balanced. Debit: 500.00, Credit: 300.00"
        );
        assert_eq!(err.error_code(), "UNBALANCED_VOUCHER");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = VoucherError::InvalidTransition {
            from: VoucherStatus::Draft,
            to: VoucherStatus::Posted,
        };
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("posted"));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(VoucherError::NoEntries.kind(), ErrorKind::Validation);
        assert_eq!(
            VoucherError::AccountNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            VoucherError::ControlAccountPosting(Uuid::nil()).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            VoucherError::AlreadyReversed {
                original: Uuid::nil(),
                reversal: Uuid::nil(),
            }
            .kind(),
            ErrorKind::StateConflict
        );
    }
}
