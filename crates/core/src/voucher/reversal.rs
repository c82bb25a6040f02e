//! Reversing entry creation for posted vouchers.
//!
//! A reversal mirrors the original voucher line by line with debit and
//! credit swapped, so posting it cancels the original's ledger effect
//! exactly.

use rust_decimal::Decimal;

use super::types::VoucherEntryInput;

/// Builds reversing entries by swapping each line's debit and credit.
///
/// Amounts, accounts, tags and line order are preserved; descriptions are
/// prefixed so the reversal is recognizable in account ledgers.
#[must_use]
pub fn reverse_entries(original: &[VoucherEntryInput]) -> Vec<VoucherEntryInput> {
    original
        .iter()
        .map(|entry| VoucherEntryInput {
            account_id: entry.account_id,
            debit: entry.credit,
            credit: entry.debit,
            description: Some(format!(
                "Reversal: {}",
                entry.description.clone().unwrap_or_default()
            )),
            tags: entry.tags.clone(),
        })
        .collect()
}

/// Validates that a set of entries is balanced. Posted vouchers always are;
/// this guards the reversal path against corrupted input.
#[must_use]
pub fn entries_balance(entries: &[VoucherEntryInput]) -> bool {
    let total_debit: Decimal = entries.iter().map(|e| e.debit).sum();
    let total_credit: Decimal = entries.iter().map(|e| e.credit).sum();
    total_debit == total_credit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voucher::types::EntryTags;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_entries() -> Vec<VoucherEntryInput> {
        vec![
            VoucherEntryInput {
                account_id: Uuid::new_v4(),
                debit: dec!(1000000),
                credit: Decimal::ZERO,
                description: Some("Cash received".to_string()),
                tags: EntryTags::default(),
            },
            VoucherEntryInput {
                account_id: Uuid::new_v4(),
                debit: Decimal::ZERO,
                credit: dec!(1000000),
                description: Some("Product sales".to_string()),
                tags: EntryTags {
                    department: Some("SALES".to_string()),
                    ..EntryTags::default()
                },
            },
        ]
    }

    #[test]
    fn test_sides_swapped_per_line() {
        let original = make_entries();
        let reversed = reverse_entries(&original);

        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].credit, original[0].debit);
        assert_eq!(reversed[0].debit, Decimal::ZERO);
        assert_eq!(reversed[1].debit, original[1].credit);
        assert_eq!(reversed[1].credit, Decimal::ZERO);
    }

    #[test]
    fn test_accounts_and_tags_preserved() {
        let original = make_entries();
        let reversed = reverse_entries(&original);

        assert_eq!(reversed[0].account_id, original[0].account_id);
        assert_eq!(reversed[1].account_id, original[1].account_id);
        assert_eq!(reversed[1].tags, original[1].tags);
    }

    #[test]
    fn test_description_prefixed() {
        let reversed = reverse_entries(&make_entries());
        assert_eq!(
            reversed[0].description.as_deref(),
            Some("Reversal: Cash received")
        );
    }

    #[test]
    fn test_reversal_still_balances() {
        let original = make_entries();
        let reversed = reverse_entries(&original);
        assert!(entries_balance(&original));
        assert!(entries_balance(&reversed));
    }

    #[test]
    fn test_entries_balance_detects_mismatch() {
        let mut entries = make_entries();
        entries[0].debit = dec!(999999);
        assert!(!entries_balance(&entries));
    }
}
