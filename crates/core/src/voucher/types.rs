//! Voucher domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Voucher status in the lifecycle state machine.
///
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
/// - Approved → Posted (post)
/// - Draft/Pending/Rejected → Cancelled (cancel)
///
/// Posted vouchers never change status again; reversing one produces a new,
/// linked voucher that is itself posted immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is being drafted and can be modified.
    Draft,
    /// Voucher has been submitted for approval.
    Pending,
    /// Voucher has been approved and is ready for posting.
    Approved,
    /// Voucher has been rejected by an approver.
    Rejected,
    /// Voucher has been posted to the ledger (immutable).
    Posted,
    /// Voucher has been cancelled before posting.
    Cancelled,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "posted" => Some(Self::Posted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the voucher header and entries can still be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Returns true if no further lifecycle transition is possible.
    /// Posted is terminal for the state machine even though a reversal
    /// voucher may still reference it.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Posted | Self::Cancelled)
    }

    /// Returns true if the voucher may be deleted outright.
    #[must_use]
    pub fn is_removable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voucher type classification.
///
/// Voucher numbers are sequenced per (company, type, period), so each type
/// forms its own series within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// General journal voucher.
    General,
    /// Sales voucher.
    Sales,
    /// Purchase voucher.
    Purchase,
    /// Outgoing payment voucher.
    Payment,
    /// Incoming receipt voucher.
    Receipt,
    /// Adjustment voucher.
    Adjustment,
    /// Year-end closing voucher.
    Closing,
}

impl VoucherType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
            Self::Adjustment => "adjustment",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensional tags on a voucher entry. Free-form and non-authoritative:
/// they never participate in balancing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTags {
    /// Business partner reference.
    pub partner: Option<String>,
    /// Department reference.
    pub department: Option<String>,
    /// Project reference.
    pub project: Option<String>,
    /// Cost center reference.
    pub cost_center: Option<String>,
}

impl EntryTags {
    /// Returns true if no tag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partner.is_none()
            && self.department.is_none()
            && self.project.is_none()
            && self.cost_center.is_none()
    }
}

/// Input for a single voucher entry line.
///
/// Exactly one of `debit`/`credit` must be strictly positive; the other must
/// be zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherEntryInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Dimensional tags.
    pub tags: EntryTags,
}

/// Input for creating a new voucher.
#[derive(Debug, Clone)]
pub struct CreateVoucherInput {
    /// The company this voucher belongs to.
    pub company_id: Uuid,
    /// The voucher type.
    pub voucher_type: VoucherType,
    /// The voucher date; determines the fiscal period.
    pub voucher_date: NaiveDate,
    /// A description of the voucher.
    pub description: String,
    /// Optional external reference (invoice number, contract id).
    pub reference: Option<String>,
    /// The entry lines, in order.
    pub entries: Vec<VoucherEntryInput>,
    /// The user creating the voucher.
    pub created_by: Uuid,
}

/// Voucher totals for validation and display.
#[derive(Debug, Clone)]
pub struct VoucherTotals {
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl VoucherTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            VoucherStatus::Draft,
            VoucherStatus::Pending,
            VoucherStatus::Approved,
            VoucherStatus::Rejected,
            VoucherStatus::Posted,
            VoucherStatus::Cancelled,
        ] {
            assert_eq!(VoucherStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VoucherStatus::parse("voided"), None);
    }

    #[test]
    fn test_status_editable() {
        assert!(VoucherStatus::Draft.is_editable());
        assert!(VoucherStatus::Pending.is_editable());
        assert!(!VoucherStatus::Approved.is_editable());
        assert!(!VoucherStatus::Rejected.is_editable());
        assert!(!VoucherStatus::Posted.is_editable());
        assert!(!VoucherStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_status_terminal() {
        assert!(VoucherStatus::Rejected.is_terminal());
        assert!(VoucherStatus::Posted.is_terminal());
        assert!(VoucherStatus::Cancelled.is_terminal());
        assert!(!VoucherStatus::Draft.is_terminal());
        assert!(!VoucherStatus::Pending.is_terminal());
        assert!(!VoucherStatus::Approved.is_terminal());
    }

    #[test]
    fn test_status_removable() {
        assert!(VoucherStatus::Draft.is_removable());
        assert!(VoucherStatus::Rejected.is_removable());
        assert!(VoucherStatus::Cancelled.is_removable());
        assert!(!VoucherStatus::Pending.is_removable());
        assert!(!VoucherStatus::Approved.is_removable());
        assert!(!VoucherStatus::Posted.is_removable());
    }

    #[test]
    fn test_totals() {
        let totals = VoucherTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);

        let totals = VoucherTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50.00));
    }

    #[test]
    fn test_empty_tags() {
        assert!(EntryTags::default().is_empty());
        let tags = EntryTags {
            department: Some("SALES".to_string()),
            ..EntryTags::default()
        };
        assert!(!tags.is_empty());
    }
}
