//! Lifecycle service for voucher state transitions.
//!
//! This module implements the core state machine logic for transitioning
//! vouchers through the approval workflow. The service is stateless: it
//! validates a transition against the current status and returns a
//! [`VoucherAction`] carrying the new status and audit trail fields, which
//! the repository applies inside its transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::VoucherError;
use super::types::VoucherStatus;

/// A validated state transition with audit data.
#[derive(Debug, Clone)]
pub enum VoucherAction {
    /// Submit a draft voucher for approval.
    Submit {
        /// The new status after submission.
        new_status: VoucherStatus,
        /// The user who submitted the voucher.
        submitted_by: Uuid,
        /// When the voucher was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Approve a pending voucher.
    Approve {
        /// The new status after approval.
        new_status: VoucherStatus,
        /// The user who approved the voucher.
        approved_by: Uuid,
        /// When the voucher was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending voucher.
    Reject {
        /// The new status after rejection.
        new_status: VoucherStatus,
        /// The user who rejected the voucher.
        rejected_by: Uuid,
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Post an approved voucher to the ledger.
    Post {
        /// The new status after posting.
        new_status: VoucherStatus,
        /// The user who posted the voucher.
        posted_by: Uuid,
        /// When the voucher was posted.
        posted_at: DateTime<Utc>,
    },
    /// Cancel a voucher before posting.
    Cancel {
        /// The new status after cancellation.
        new_status: VoucherStatus,
        /// The user who cancelled the voucher.
        cancelled_by: Uuid,
    },
}

impl VoucherAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Post { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }
}

/// Stateless service for voucher workflow transitions.
pub struct LifecycleService;

impl LifecycleService {
    /// Submit a draft voucher for approval.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::InvalidTransition`] if the voucher is not in
    /// Draft status. Entry validation happens separately, before this call.
    pub fn submit(
        current_status: VoucherStatus,
        submitted_by: Uuid,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Draft => Ok(VoucherAction::Submit {
                new_status: VoucherStatus::Pending,
                submitted_by,
                submitted_at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Pending,
            }),
        }
    }

    /// Approve a pending voucher.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::InvalidTransition`] if not in Pending status.
    pub fn approve(
        current_status: VoucherStatus,
        approved_by: Uuid,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Pending => Ok(VoucherAction::Approve {
                new_status: VoucherStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Approved,
            }),
        }
    }

    /// Reject a pending voucher.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::InvalidTransition`] if not in Pending status,
    /// or [`VoucherError::RejectionReasonRequired`] if the reason is empty.
    pub fn reject(
        current_status: VoucherStatus,
        rejected_by: Uuid,
        rejection_reason: String,
    ) -> Result<VoucherAction, VoucherError> {
        if rejection_reason.trim().is_empty() {
            return Err(VoucherError::RejectionReasonRequired);
        }

        match current_status {
            VoucherStatus::Pending => Ok(VoucherAction::Reject {
                new_status: VoucherStatus::Rejected,
                rejected_by,
                rejection_reason,
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Rejected,
            }),
        }
    }

    /// Post an approved voucher to the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::InvalidTransition`] if not in Approved status.
    pub fn post(
        current_status: VoucherStatus,
        posted_by: Uuid,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Approved => Ok(VoucherAction::Post {
                new_status: VoucherStatus::Posted,
                posted_by,
                posted_at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Posted,
            }),
        }
    }

    /// Cancel a voucher that has not been posted.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::InvalidTransition`] unless the voucher is in
    /// Draft, Pending or Rejected status.
    pub fn cancel(
        current_status: VoucherStatus,
        cancelled_by: Uuid,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Draft | VoucherStatus::Pending | VoucherStatus::Rejected => {
                Ok(VoucherAction::Cancel {
                    new_status: VoucherStatus::Cancelled,
                    cancelled_by,
                })
            }
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Cancelled,
            }),
        }
    }

    /// Validate that a voucher can be reversed.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::NotReversible`] unless posted, or
    /// [`VoucherError::AlreadyReversed`] if a reversal already exists.
    pub fn validate_reversible(
        voucher_id: Uuid,
        current_status: VoucherStatus,
        reversed_by: Option<Uuid>,
    ) -> Result<(), VoucherError> {
        if current_status != VoucherStatus::Posted {
            return Err(VoucherError::NotReversible(voucher_id));
        }
        if let Some(reversal) = reversed_by {
            return Err(VoucherError::AlreadyReversed {
                original: voucher_id,
                reversal,
            });
        }
        Ok(())
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (VoucherStatus::Draft, VoucherStatus::Pending)
                | (
                    VoucherStatus::Pending,
                    VoucherStatus::Approved | VoucherStatus::Rejected
                )
                | (VoucherStatus::Approved, VoucherStatus::Posted)
                | (
                    VoucherStatus::Draft | VoucherStatus::Pending | VoucherStatus::Rejected,
                    VoucherStatus::Cancelled
                )
        )
    }
}
