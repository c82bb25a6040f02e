//! Property-based tests for balance roll-forward.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::AccountNature;

use super::balance::{BalancePair, LedgerBalance, carry_opening, roll_forward, signed_movement};

/// Strategy for amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn pair_strategy() -> impl Strategy<Value = BalancePair> {
    (amount_strategy(), amount_strategy()).prop_map(|(d, c)| BalancePair::new(d, c))
}

fn nature_strategy() -> impl Strategy<Value = AccountNature> {
    prop_oneof![Just(AccountNature::Debit), Just(AccountNature::Credit)]
}

/// Strategy for a sequence of period movements.
fn movements_strategy() -> impl Strategy<Value = Vec<BalancePair>> {
    prop::collection::vec(pair_strategy(), 1..=12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The closing net always equals opening net plus signed movement.
    #[test]
    fn prop_closing_net_is_opening_plus_movement(
        nature in nature_strategy(),
        opening in pair_strategy(),
        period in pair_strategy(),
    ) {
        let closing = roll_forward(nature, opening, period);
        prop_assert_eq!(
            closing.net(nature),
            opening.net(nature) + signed_movement(nature, period.debit, period.credit)
        );
    }

    /// The closing pair never has both columns set.
    #[test]
    fn prop_closing_is_single_sided(
        nature in nature_strategy(),
        opening in pair_strategy(),
        period in pair_strategy(),
    ) {
        let closing = roll_forward(nature, opening, period);
        prop_assert!(closing.debit.is_zero() || closing.credit.is_zero());
    }

    /// Chaining periods with `closing(N) == opening(N+1)` gives the same
    /// result as applying all movements to one period.
    #[test]
    fn prop_chain_equals_flat_sum(
        nature in nature_strategy(),
        movements in movements_strategy(),
    ) {
        // Chain: carry each closing into the next opening.
        let mut opening = carry_opening(None);
        for period in &movements {
            opening = roll_forward(nature, opening, *period);
        }
        let chained_net = opening.net(nature);

        // Flat: one period holding every movement.
        let mut flat = BalancePair::ZERO;
        for period in &movements {
            flat.accumulate(period.debit, period.credit);
        }
        let flat_net = roll_forward(nature, BalancePair::ZERO, flat).net(nature);

        prop_assert_eq!(chained_net, flat_net);
    }

    /// Roll-forward is deterministic.
    #[test]
    fn prop_roll_forward_deterministic(
        nature in nature_strategy(),
        opening in pair_strategy(),
        period in pair_strategy(),
    ) {
        prop_assert_eq!(
            roll_forward(nature, opening, period),
            roll_forward(nature, opening, period)
        );
    }

    /// A zero movement preserves the opening net.
    #[test]
    fn prop_zero_movement_preserves_net(
        nature in nature_strategy(),
        opening in pair_strategy(),
    ) {
        let closing = roll_forward(nature, opening, BalancePair::ZERO);
        prop_assert_eq!(closing.net(nature), opening.net(nature));
    }

    /// `apply_entry` maintains `closing == roll_forward(opening, period)`.
    #[test]
    fn prop_apply_entry_invariant(
        nature in nature_strategy(),
        opening in pair_strategy(),
        entries in prop::collection::vec((amount_strategy(), amount_strategy()), 1..=20),
    ) {
        let mut balance = LedgerBalance::open(Uuid::nil(), 2024, 1, opening);
        for (debit, credit) in entries {
            balance.apply_entry(nature, debit, credit);
            prop_assert_eq!(
                balance.closing,
                roll_forward(nature, balance.opening, balance.period)
            );
        }
    }
}
