//! Year-end closing entry construction.
//!
//! At year end every revenue and expense account is zeroed out against the
//! retained earnings account, so only balance-sheet accounts carry balances
//! into the next fiscal year.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use kassa_shared::ErrorKind;

use crate::account::AccountType;
use crate::voucher::types::{EntryTags, VoucherEntryInput};

/// Errors raised while preparing a year-end close.
#[derive(Debug, Error)]
pub enum ClosingError {
    /// The designated retained earnings account is not an equity account.
    #[error("Retained earnings account {account_id} must be an equity account, got {account_type}")]
    RetainedEarningsNotEquity {
        /// The designated account.
        account_id: Uuid,
        /// Its actual type.
        account_type: AccountType,
    },
}

impl ClosingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RetainedEarningsNotEquity { .. } => "RETAINED_EARNINGS_NOT_EQUITY",
        }
    }

    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RetainedEarningsNotEquity { .. } => ErrorKind::Validation,
        }
    }
}

/// Year-end closing balance of one account.
#[derive(Debug, Clone)]
pub struct ClosingBalance {
    /// The account.
    pub account_id: Uuid,
    /// Its classification.
    pub account_type: AccountType,
    /// Closing debit column for the final period of the year.
    pub closing_debit: Decimal,
    /// Closing credit column for the final period of the year.
    pub closing_credit: Decimal,
}

/// Validates the designated retained earnings account.
///
/// # Errors
///
/// Returns [`ClosingError::RetainedEarningsNotEquity`] for any non-equity
/// account.
pub fn validate_retained_earnings(
    account_id: Uuid,
    account_type: AccountType,
) -> Result<(), ClosingError> {
    if account_type != AccountType::Equity {
        return Err(ClosingError::RetainedEarningsNotEquity {
            account_id,
            account_type,
        });
    }
    Ok(())
}

/// Builds the closing voucher entries for a year-end close.
///
/// Every revenue and expense account with a non-zero closing balance gets
/// one entry on the opposite side, zeroing it; the net of those entries is
/// booked against the retained earnings account. Non-P&L rows in the input
/// are ignored. Returns an empty vector when there is nothing to close.
///
/// The result always balances by construction.
#[must_use]
pub fn build_closing_entries(
    balances: &[ClosingBalance],
    retained_earnings_id: Uuid,
) -> Vec<VoucherEntryInput> {
    let mut entries = Vec::new();

    for balance in balances {
        if !balance.account_type.is_profit_and_loss() {
            continue;
        }
        // Net toward the debit column; zeroing means booking the opposite.
        let net_debit = balance.closing_debit - balance.closing_credit;
        if net_debit.is_zero() {
            continue;
        }

        let (debit, credit) = if net_debit > Decimal::ZERO {
            (Decimal::ZERO, net_debit)
        } else {
            (-net_debit, Decimal::ZERO)
        };

        entries.push(VoucherEntryInput {
            account_id: balance.account_id,
            debit,
            credit,
            description: None,
            tags: EntryTags::default(),
        });
    }

    if entries.is_empty() {
        return entries;
    }

    // Net income: revenues arrive as debits (their zeroing side), expenses
    // as credits. A surplus is credited to retained earnings.
    let total_debit: Decimal = entries.iter().map(|e| e.debit).sum();
    let total_credit: Decimal = entries.iter().map(|e| e.credit).sum();
    let net_income = total_debit - total_credit;

    if !net_income.is_zero() {
        let (debit, credit) = if net_income > Decimal::ZERO {
            (Decimal::ZERO, net_income)
        } else {
            (-net_income, Decimal::ZERO)
        };
        entries.push(VoucherEntryInput {
            account_id: retained_earnings_id,
            debit,
            credit,
            description: Some("Net income for the year".to_string()),
            tags: EntryTags::default(),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voucher::reversal::entries_balance;
    use rust_decimal_macros::dec;

    fn pnl(account_type: AccountType, debit: Decimal, credit: Decimal) -> ClosingBalance {
        ClosingBalance {
            account_id: Uuid::new_v4(),
            account_type,
            closing_debit: debit,
            closing_credit: credit,
        }
    }

    #[test]
    fn test_retained_earnings_must_be_equity() {
        let id = Uuid::new_v4();
        assert!(validate_retained_earnings(id, AccountType::Equity).is_ok());
        assert!(matches!(
            validate_retained_earnings(id, AccountType::Revenue),
            Err(ClosingError::RetainedEarningsNotEquity { .. })
        ));
    }

    #[test]
    fn test_profit_year() {
        let revenue = pnl(AccountType::Revenue, Decimal::ZERO, dec!(5000));
        let expense = pnl(AccountType::Expense, dec!(3000), Decimal::ZERO);
        let retained = Uuid::new_v4();

        let entries = build_closing_entries(&[revenue.clone(), expense.clone()], retained);

        assert_eq!(entries.len(), 3);
        // Revenue zeroed with a debit.
        assert_eq!(entries[0].account_id, revenue.account_id);
        assert_eq!(entries[0].debit, dec!(5000));
        // Expense zeroed with a credit.
        assert_eq!(entries[1].account_id, expense.account_id);
        assert_eq!(entries[1].credit, dec!(3000));
        // Net income of 2000 credited to retained earnings.
        assert_eq!(entries[2].account_id, retained);
        assert_eq!(entries[2].credit, dec!(2000));
        assert!(entries_balance(&entries));
    }

    #[test]
    fn test_loss_year() {
        let revenue = pnl(AccountType::Revenue, Decimal::ZERO, dec!(1000));
        let expense = pnl(AccountType::Expense, dec!(4000), Decimal::ZERO);
        let retained = Uuid::new_v4();

        let entries = build_closing_entries(&[revenue, expense], retained);

        // Loss of 3000 debited to retained earnings.
        assert_eq!(entries[2].account_id, retained);
        assert_eq!(entries[2].debit, dec!(3000));
        assert!(entries_balance(&entries));
    }

    #[test]
    fn test_break_even_year_skips_retained_earnings() {
        let revenue = pnl(AccountType::Revenue, Decimal::ZERO, dec!(2500));
        let expense = pnl(AccountType::Expense, dec!(2500), Decimal::ZERO);

        let entries = build_closing_entries(&[revenue, expense], Uuid::new_v4());

        assert_eq!(entries.len(), 2);
        assert!(entries_balance(&entries));
    }

    #[test]
    fn test_balance_sheet_accounts_ignored() {
        let asset = pnl(AccountType::Asset, dec!(9000), Decimal::ZERO);
        let entries = build_closing_entries(&[asset], Uuid::new_v4());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_zero_balances_produce_no_voucher() {
        let revenue = pnl(AccountType::Revenue, Decimal::ZERO, Decimal::ZERO);
        let entries = build_closing_entries(&[revenue], Uuid::new_v4());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_contra_revenue_zeroed_on_credit_side() {
        // A revenue account driven to a debit-side balance (e.g. returns).
        let contra = pnl(AccountType::Revenue, dec!(700), Decimal::ZERO);
        let retained = Uuid::new_v4();
        let entries = build_closing_entries(&[contra], retained);

        assert_eq!(entries[0].credit, dec!(700));
        assert_eq!(entries[1].account_id, retained);
        assert_eq!(entries[1].debit, dec!(700));
        assert!(entries_balance(&entries));
    }
}
