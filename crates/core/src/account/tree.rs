//! Materialized-path tree math for the account hierarchy.
//!
//! Paths are ancestor codes joined with `/`, ending in the account's own
//! code (`1000/1001/1001.01`). Codes can never contain `/`, so prefix tests
//! on the separator boundary are unambiguous.

use std::collections::HashMap;

use uuid::Uuid;

use super::error::AccountError;
use super::types::{Account, AccountTreeNode};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// Derives the path of an account from its parent's path and its own code.
#[must_use]
pub fn child_path(parent_path: Option<&str>, code: &str) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{code}"),
        None => code.to_string(),
    }
}

/// Derives the level of an account from its parent's level; roots are 1.
#[must_use]
pub fn child_level(parent_level: Option<i16>) -> i16 {
    parent_level.map_or(1, |l| l + 1)
}

/// Returns true if `candidate_path` is `node_path` itself or lies inside its
/// subtree. Used to reject moves that would create a cycle.
#[must_use]
pub fn is_self_or_descendant(node_path: &str, candidate_path: &str) -> bool {
    candidate_path == node_path
        || candidate_path
            .strip_prefix(node_path)
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}

/// Validates that moving the account at `node_path` under the parent at
/// `target_parent_path` does not create a cycle.
///
/// # Errors
///
/// Returns [`AccountError::MoveIntoSubtree`] when the target parent is the
/// node itself or one of its descendants.
pub fn validate_move(
    node_id: Uuid,
    node_path: &str,
    target_parent_path: &str,
) -> Result<(), AccountError> {
    if is_self_or_descendant(node_path, target_parent_path) {
        return Err(AccountError::MoveIntoSubtree(node_id));
    }
    Ok(())
}

/// Rewrites a descendant's path after its ancestor moved from `old_prefix`
/// to `new_prefix`. The caller guarantees `path` lies inside the old subtree.
#[must_use]
pub fn rebase_path(old_prefix: &str, new_prefix: &str, path: &str) -> String {
    debug_assert!(is_self_or_descendant(old_prefix, path));
    format!("{new_prefix}{}", &path[old_prefix.len()..])
}

/// Assembles a flat account list into a forest ordered by `sort_order` then
/// code. Accounts whose parent is absent from the input (filtered out or
/// root) become top-level nodes.
#[must_use]
pub fn build_account_tree(mut accounts: Vec<Account>) -> Vec<AccountTreeNode> {
    accounts.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.code.cmp(&b.code))
    });

    let present: HashMap<_, _> = accounts.iter().map(|a| (a.id, ())).collect();

    // Children grouped by parent, preserving the sorted order.
    let mut by_parent: HashMap<Option<_>, Vec<Account>> = HashMap::new();
    for account in accounts {
        let key = match account.parent_id {
            Some(pid) if present.contains_key(&pid) => Some(pid),
            _ => None,
        };
        by_parent.entry(key).or_default().push(account);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|a| attach_children(a, &mut by_parent))
        .collect()
}

fn attach_children(
    account: Account,
    by_parent: &mut HashMap<Option<kassa_shared::types::AccountId>, Vec<Account>>,
) -> AccountTreeNode {
    let children = by_parent
        .remove(&Some(account.id))
        .unwrap_or_default()
        .into_iter()
        .map(|c| attach_children(c, by_parent))
        .collect();
    AccountTreeNode { account, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::types::{AccountNature, AccountType};
    use kassa_shared::types::{AccountId, CompanyId};

    fn make_account(
        code: &str,
        parent: Option<&Account>,
        sort_order: i32,
    ) -> Account {
        Account {
            id: AccountId::new(),
            company_id: CompanyId::from_uuid(Uuid::nil()),
            code: code.to_string(),
            name: format!("Account {code}"),
            parent_id: parent.map(|p| p.id),
            level: child_level(parent.map(|p| p.level)),
            path: child_path(parent.map(|p| p.path.as_str()), code),
            account_type: AccountType::Asset,
            nature: AccountNature::Debit,
            is_control: false,
            allow_direct_posting: true,
            is_active: true,
            sort_order,
        }
    }

    #[test]
    fn test_child_path_and_level() {
        assert_eq!(child_path(None, "1000"), "1000");
        assert_eq!(child_path(Some("1000"), "1001"), "1000/1001");
        assert_eq!(child_level(None), 1);
        assert_eq!(child_level(Some(2)), 3);
    }

    #[test]
    fn test_self_or_descendant() {
        assert!(is_self_or_descendant("1000", "1000"));
        assert!(is_self_or_descendant("1000", "1000/1001"));
        assert!(is_self_or_descendant("1000", "1000/1001/1002"));
        // Sibling with a longer code is not a descendant.
        assert!(!is_self_or_descendant("1000", "10001"));
        assert!(!is_self_or_descendant("1000/1001", "1000"));
    }

    #[test]
    fn test_validate_move_rejects_own_subtree() {
        let id = Uuid::new_v4();
        assert!(matches!(
            validate_move(id, "1000", "1000/1001"),
            Err(AccountError::MoveIntoSubtree(e)) if e == id
        ));
        assert!(matches!(
            validate_move(id, "1000", "1000"),
            Err(AccountError::MoveIntoSubtree(_))
        ));
        assert!(validate_move(id, "1000", "2000").is_ok());
    }

    #[test]
    fn test_rebase_path() {
        assert_eq!(
            rebase_path("1000", "2000/1000", "1000/1001/1002"),
            "2000/1000/1001/1002"
        );
        assert_eq!(rebase_path("1000/1001", "1001", "1000/1001"), "1001");
    }

    #[test]
    fn test_build_tree_nesting() {
        let root = make_account("1000", None, 1);
        let child_a = make_account("1001", Some(&root), 2);
        let child_b = make_account("1002", Some(&root), 1);
        let grandchild = make_account("1001.01", Some(&child_a), 1);
        let other_root = make_account("2000", None, 2);

        let tree = build_account_tree(vec![
            grandchild.clone(),
            child_a.clone(),
            root.clone(),
            other_root.clone(),
            child_b.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].account.code, "1000");
        assert_eq!(tree[1].account.code, "2000");
        // Siblings ordered by sort_order, not code.
        assert_eq!(tree[0].children[0].account.code, "1002");
        assert_eq!(tree[0].children[1].account.code, "1001");
        assert_eq!(tree[0].children[1].children[0].account.code, "1001.01");
    }

    #[test]
    fn test_build_tree_promotes_orphans() {
        let root = make_account("1000", None, 1);
        let child = make_account("1001", Some(&root), 1);
        // Parent filtered out of the listing: the child surfaces at top level.
        let tree = build_account_tree(vec![child.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].account.code, "1001");
    }
}
