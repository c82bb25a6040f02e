//! Property-based tests for the voucher state machine.

use proptest::prelude::*;
use uuid::Uuid;

use super::service::LifecycleService;
use super::types::VoucherStatus;

/// Strategy for generating voucher statuses.
fn status_strategy() -> impl Strategy<Value = VoucherStatus> {
    prop_oneof![
        Just(VoucherStatus::Draft),
        Just(VoucherStatus::Pending),
        Just(VoucherStatus::Approved),
        Just(VoucherStatus::Rejected),
        Just(VoucherStatus::Posted),
        Just(VoucherStatus::Cancelled),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Each transition helper succeeds exactly when the transition table
    /// says it should.
    #[test]
    fn prop_helpers_agree_with_transition_table(status in status_strategy()) {
        let user = Uuid::nil();

        prop_assert_eq!(
            LifecycleService::submit(status, user).is_ok(),
            LifecycleService::is_valid_transition(status, VoucherStatus::Pending)
        );
        prop_assert_eq!(
            LifecycleService::approve(status, user).is_ok(),
            LifecycleService::is_valid_transition(status, VoucherStatus::Approved)
        );
        prop_assert_eq!(
            LifecycleService::reject(status, user, "reason".to_string()).is_ok(),
            LifecycleService::is_valid_transition(status, VoucherStatus::Rejected)
        );
        prop_assert_eq!(
            LifecycleService::post(status, user).is_ok(),
            LifecycleService::is_valid_transition(status, VoucherStatus::Posted)
        );
        prop_assert_eq!(
            LifecycleService::cancel(status, user).is_ok(),
            LifecycleService::is_valid_transition(status, VoucherStatus::Cancelled)
        );
    }

    /// Terminal statuses admit no outgoing transition.
    #[test]
    fn prop_terminal_statuses_are_sinks(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        if from.is_terminal() {
            prop_assert!(!LifecycleService::is_valid_transition(from, to));
        }
    }

    /// No transition is a self-loop.
    #[test]
    fn prop_no_self_loops(status in status_strategy()) {
        prop_assert!(!LifecycleService::is_valid_transition(status, status));
    }

    /// A successful action always lands on the status it names.
    #[test]
    fn prop_action_status_consistent(status in status_strategy()) {
        let user = Uuid::nil();
        if let Ok(action) = LifecycleService::submit(status, user) {
            prop_assert_eq!(action.new_status(), VoucherStatus::Pending);
        }
        if let Ok(action) = LifecycleService::approve(status, user) {
            prop_assert_eq!(action.new_status(), VoucherStatus::Approved);
        }
        if let Ok(action) = LifecycleService::post(status, user) {
            prop_assert_eq!(action.new_status(), VoucherStatus::Posted);
        }
        if let Ok(action) = LifecycleService::cancel(status, user) {
            prop_assert_eq!(action.new_status(), VoucherStatus::Cancelled);
        }
    }

    /// Posted vouchers are only reversible while unreversed.
    #[test]
    fn prop_reversibility(status in status_strategy(), already in any::<bool>()) {
        let id = Uuid::nil();
        let reversed_by = already.then(Uuid::new_v4);
        let result = LifecycleService::validate_reversible(id, status, reversed_by);
        prop_assert_eq!(
            result.is_ok(),
            status == VoucherStatus::Posted && !already
        );
    }
}
