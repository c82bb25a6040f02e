//! Property-based tests for reversing entry creation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::reversal::{entries_balance, reverse_entries};
use super::types::{EntryTags, VoucherEntryInput};

/// Strategy for positive amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a single one-sided entry.
fn entry_strategy() -> impl Strategy<Value = VoucherEntryInput> {
    (amount_strategy(), any::<bool>(), any::<u128>()).prop_map(|(amount, is_debit, account)| {
        VoucherEntryInput {
            account_id: Uuid::from_u128(account),
            debit: if is_debit { amount } else { Decimal::ZERO },
            credit: if is_debit { Decimal::ZERO } else { amount },
            description: None,
            tags: EntryTags::default(),
        }
    })
}

fn entries_strategy() -> impl Strategy<Value = Vec<VoucherEntryInput>> {
    prop::collection::vec(entry_strategy(), 1..=10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversal is an involution on the amount columns.
    #[test]
    fn prop_double_reversal_restores_amounts(entries in entries_strategy()) {
        let twice = reverse_entries(&reverse_entries(&entries));
        for (original, restored) in entries.iter().zip(twice.iter()) {
            prop_assert_eq!(original.debit, restored.debit);
            prop_assert_eq!(original.credit, restored.credit);
            prop_assert_eq!(original.account_id, restored.account_id);
        }
    }

    /// Reversing swaps the side of every line.
    #[test]
    fn prop_each_line_swapped(entries in entries_strategy()) {
        let reversed = reverse_entries(&entries);
        prop_assert_eq!(entries.len(), reversed.len());
        for (original, swapped) in entries.iter().zip(reversed.iter()) {
            prop_assert_eq!(original.debit, swapped.credit);
            prop_assert_eq!(original.credit, swapped.debit);
        }
    }

    /// A balanced voucher reverses into a balanced voucher.
    #[test]
    fn prop_balance_preserved(mut entries in entries_strategy()) {
        // Append a compensating line so the voucher balances.
        let debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = entries.iter().map(|e| e.credit).sum();
        let net = debit - credit;
        if !net.is_zero() {
            entries.push(VoucherEntryInput {
                account_id: Uuid::from_u128(0xB41A),
                debit: if net < Decimal::ZERO { -net } else { Decimal::ZERO },
                credit: if net > Decimal::ZERO { net } else { Decimal::ZERO },
                description: None,
                tags: EntryTags::default(),
            });
        }
        prop_assert!(entries_balance(&entries));
        prop_assert!(entries_balance(&reverse_entries(&entries)));
    }

    /// Total debits of the reversal equal total credits of the original.
    #[test]
    fn prop_totals_mirrored(entries in entries_strategy()) {
        let reversed = reverse_entries(&entries);
        let original_debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let original_credit: Decimal = entries.iter().map(|e| e.credit).sum();
        let reversed_debit: Decimal = reversed.iter().map(|e| e.debit).sum();
        let reversed_credit: Decimal = reversed.iter().map(|e| e.credit).sum();
        prop_assert_eq!(original_debit, reversed_credit);
        prop_assert_eq!(original_credit, reversed_debit);
    }
}
