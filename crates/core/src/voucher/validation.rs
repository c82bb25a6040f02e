//! Submit-time voucher validation.
//!
//! Performs every check that must pass before a voucher leaves Draft:
//! entry shape, account eligibility, and the balance invariant. All checks
//! run before any state mutation; a failure leaves the voucher untouched.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::VoucherError;
use super::types::{VoucherEntryInput, VoucherTotals};

/// Information about an account needed for entry validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account is a control (aggregation-only) account.
    pub is_control: bool,
    /// Whether the account allows direct posting.
    pub allow_direct_posting: bool,
}

/// Validates voucher entries and computes totals.
///
/// Checks, in order:
/// 1. At least one entry is present.
/// 2. Every entry sets exactly one strictly positive side.
/// 3. Every referenced account is active, not a control account, and allows
///    direct posting (resolved through `account_lookup`).
/// 4. Total debits equal total credits.
///
/// # Errors
///
/// Returns the first `VoucherError` encountered; the caller must not have
/// mutated any state yet.
pub fn validate_entries<A>(
    entries: &[VoucherEntryInput],
    account_lookup: A,
) -> Result<VoucherTotals, VoucherError>
where
    A: Fn(Uuid) -> Result<AccountInfo, VoucherError>,
{
    if entries.is_empty() {
        return Err(VoucherError::NoEntries);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (idx, entry) in entries.iter().enumerate() {
        let line_no = idx + 1;
        validate_entry_sides(entry, line_no)?;

        let account = account_lookup(entry.account_id)?;
        if !account.is_active {
            return Err(VoucherError::AccountInactive(entry.account_id));
        }
        if account.is_control {
            return Err(VoucherError::ControlAccountPosting(entry.account_id));
        }
        if !account.allow_direct_posting {
            return Err(VoucherError::AccountNoDirectPosting(entry.account_id));
        }

        total_debit += entry.debit;
        total_credit += entry.credit;
    }

    let totals = VoucherTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(VoucherError::Unbalanced {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }

    Ok(totals)
}

/// Validates that exactly one of debit/credit is strictly positive.
fn validate_entry_sides(entry: &VoucherEntryInput, line_no: usize) -> Result<(), VoucherError> {
    if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
        return Err(VoucherError::NegativeAmount { line_no });
    }
    match (
        entry.debit > Decimal::ZERO,
        entry.credit > Decimal::ZERO,
    ) {
        (true, true) => Err(VoucherError::BothSidesSet { line_no }),
        (false, false) => Err(VoucherError::NoSideSet { line_no }),
        _ => Ok(()),
    }
}
