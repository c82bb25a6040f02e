//! Property-based tests for materialized-path tree math.

use proptest::prelude::*;
use uuid::Uuid;

use super::tree::{child_level, child_path, is_self_or_descendant, rebase_path, validate_move};

/// Strategy for valid account codes.
fn code_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,8}"
}

/// Strategy for a chain of codes forming a root-to-leaf path.
fn code_chain_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(code_strategy(), 1..=5)
}

fn join(chain: &[String]) -> String {
    chain.join("/")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Building a path segment by segment matches joining the codes.
    #[test]
    fn prop_child_path_matches_join(chain in code_chain_strategy()) {
        let mut path: Option<String> = None;
        for code in &chain {
            let next = child_path(path.as_deref(), code);
            path = Some(next);
        }
        prop_assert_eq!(path.unwrap(), join(&chain));
    }

    /// Level always equals the number of path segments.
    #[test]
    fn prop_level_equals_segment_count(chain in code_chain_strategy()) {
        let mut level: Option<i16> = None;
        for _ in &chain {
            level = Some(child_level(level));
        }
        prop_assert_eq!(level.unwrap() as usize, chain.len());
    }

    /// Every prefix chain of a path is an ancestor-or-self of it.
    #[test]
    fn prop_prefix_chains_are_ancestors(chain in code_chain_strategy()) {
        let full = join(&chain);
        for cut in 1..=chain.len() {
            let prefix = join(&chain[..cut]);
            prop_assert!(is_self_or_descendant(&prefix, &full));
        }
    }

    /// A node is never a descendant of a disjoint subtree.
    #[test]
    fn prop_disjoint_subtrees(
        a in code_chain_strategy(),
        b in code_chain_strategy(),
    ) {
        prop_assume!(a[0] != b[0]);
        prop_assert!(!is_self_or_descendant(&join(&a), &join(&b)));
        prop_assert!(!is_self_or_descendant(&join(&b), &join(&a)));
    }

    /// Moves into the node's own subtree are rejected, moves elsewhere pass.
    #[test]
    fn prop_move_validation(
        node in code_chain_strategy(),
        target in code_chain_strategy(),
    ) {
        let node_path = join(&node);
        let target_path = join(&target);
        let inside = is_self_or_descendant(&node_path, &target_path);
        let result = validate_move(Uuid::nil(), &node_path, &target_path);
        prop_assert_eq!(result.is_err(), inside);
    }

    /// Rebasing preserves the tail below the moved ancestor.
    #[test]
    fn prop_rebase_preserves_tail(
        old_prefix in code_chain_strategy(),
        tail in prop::collection::vec(code_strategy(), 0..=4),
        new_prefix in code_chain_strategy(),
    ) {
        let old = join(&old_prefix);
        let new = join(&new_prefix);
        let mut segments = old_prefix.clone();
        segments.extend(tail.iter().cloned());
        let path = join(&segments);

        let rebased = rebase_path(&old, &new, &path);

        let mut expected_segments = new_prefix.clone();
        expected_segments.extend(tail.iter().cloned());
        prop_assert_eq!(rebased, join(&expected_segments));
    }
}
