//! Balance pair and roll-forward calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountNature;

/// A debit/credit column pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePair {
    /// Debit column amount.
    pub debit: Decimal,
    /// Credit column amount.
    pub credit: Decimal,
}

impl BalancePair {
    /// A zero pair.
    pub const ZERO: Self = Self {
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
    };

    /// Creates a pair from both columns.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Returns true if both columns are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }

    /// Adds amounts to both columns.
    pub fn accumulate(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }

    /// Returns the net of the pair signed toward the given nature's side:
    /// positive means the balance sits on the account's normal side.
    #[must_use]
    pub fn net(&self, nature: AccountNature) -> Decimal {
        match nature {
            AccountNature::Debit => self.debit - self.credit,
            AccountNature::Credit => self.credit - self.debit,
        }
    }
}

/// The movement of a period signed toward the account's nature:
/// debit-normal accounts grow with debits, credit-normal with credits.
#[must_use]
pub fn signed_movement(nature: AccountNature, debit: Decimal, credit: Decimal) -> Decimal {
    match nature {
        AccountNature::Debit => debit - credit,
        AccountNature::Credit => credit - debit,
    }
}

/// Computes the closing pair: `closing = opening + period movement`, with
/// the net placed in a single column. A positive net sits on the account's
/// normal side; a negative net flips to the opposite column.
#[must_use]
pub fn roll_forward(nature: AccountNature, opening: BalancePair, period: BalancePair) -> BalancePair {
    let net = opening.net(nature) + signed_movement(nature, period.debit, period.credit);

    let (own, opposite) = if net >= Decimal::ZERO {
        (net, Decimal::ZERO)
    } else {
        (Decimal::ZERO, -net)
    };

    match nature {
        AccountNature::Debit => BalancePair::new(own, opposite),
        AccountNature::Credit => BalancePair::new(opposite, own),
    }
}

/// The opening pair of a period: the prior period's closing, or zero when
/// there is no prior coverage.
#[must_use]
pub fn carry_opening(previous_closing: Option<BalancePair>) -> BalancePair {
    previous_closing.unwrap_or(BalancePair::ZERO)
}

/// A full balance row for one account in one fiscal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerBalance {
    /// The account.
    pub account_id: Uuid,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal month (1-12).
    pub fiscal_month: u32,
    /// Opening balance, carried from the prior period.
    pub opening: BalancePair,
    /// Sum of posted movements in this period.
    pub period: BalancePair,
    /// Closing balance.
    pub closing: BalancePair,
}

impl LedgerBalance {
    /// Creates an empty balance row with the given opening.
    #[must_use]
    pub fn open(account_id: Uuid, fiscal_year: i32, fiscal_month: u32, opening: BalancePair) -> Self {
        Self {
            account_id,
            fiscal_year,
            fiscal_month,
            opening,
            period: BalancePair::ZERO,
            closing: opening,
        }
    }

    /// Applies one posted entry's amounts and recomputes the closing.
    pub fn apply_entry(&mut self, nature: AccountNature, debit: Decimal, credit: Decimal) {
        self.period.accumulate(debit, credit);
        self.closing = roll_forward(nature, self.opening, self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_movement() {
        assert_eq!(
            signed_movement(AccountNature::Debit, dec!(100), dec!(30)),
            dec!(70)
        );
        assert_eq!(
            signed_movement(AccountNature::Credit, dec!(30), dec!(100)),
            dec!(70)
        );
        assert_eq!(
            signed_movement(AccountNature::Credit, dec!(100), dec!(30)),
            dec!(-70)
        );
    }

    #[test]
    fn test_roll_forward_debit_nature() {
        let opening = BalancePair::new(dec!(1000), Decimal::ZERO);
        let period = BalancePair::new(dec!(500), dec!(200));
        let closing = roll_forward(AccountNature::Debit, opening, period);
        assert_eq!(closing, BalancePair::new(dec!(1300), Decimal::ZERO));
    }

    #[test]
    fn test_roll_forward_credit_nature() {
        let opening = BalancePair::new(Decimal::ZERO, dec!(1000));
        let period = BalancePair::new(dec!(200), dec!(500));
        let closing = roll_forward(AccountNature::Credit, opening, period);
        assert_eq!(closing, BalancePair::new(Decimal::ZERO, dec!(1300)));
    }

    #[test]
    fn test_roll_forward_flips_to_opposite_column() {
        // An asset driven negative shows up in the credit column.
        let opening = BalancePair::new(dec!(100), Decimal::ZERO);
        let period = BalancePair::new(Decimal::ZERO, dec!(250));
        let closing = roll_forward(AccountNature::Debit, opening, period);
        assert_eq!(closing, BalancePair::new(Decimal::ZERO, dec!(150)));
    }

    #[test]
    fn test_carry_opening() {
        assert_eq!(carry_opening(None), BalancePair::ZERO);
        let closing = BalancePair::new(dec!(42), Decimal::ZERO);
        assert_eq!(carry_opening(Some(closing)), closing);
    }

    #[test]
    fn test_apply_entry_keeps_closing_consistent() {
        let mut balance = LedgerBalance::open(
            Uuid::new_v4(),
            2024,
            1,
            BalancePair::new(dec!(1000), Decimal::ZERO),
        );
        balance.apply_entry(AccountNature::Debit, dec!(1000000), Decimal::ZERO);
        balance.apply_entry(AccountNature::Debit, Decimal::ZERO, dec!(400000));

        assert_eq!(balance.period, BalancePair::new(dec!(1000000), dec!(400000)));
        assert_eq!(
            balance.closing,
            BalancePair::new(dec!(601000), Decimal::ZERO)
        );
    }

    #[test]
    fn test_net() {
        let pair = BalancePair::new(dec!(300), dec!(100));
        assert_eq!(pair.net(AccountNature::Debit), dec!(200));
        assert_eq!(pair.net(AccountNature::Credit), dec!(-200));
    }
}
