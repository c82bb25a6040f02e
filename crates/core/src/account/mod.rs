//! Chart of accounts domain logic.
//!
//! The account hierarchy is a per-company tree represented with a
//! materialized `path` of ancestor codes plus a `level` integer, so subtree
//! queries and cycle checks never need live pointer traversal.

pub mod error;
pub mod tree;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tree_props;

pub use error::AccountError;
pub use tree::{
    build_account_tree, child_level, child_path, is_self_or_descendant, rebase_path, validate_move,
};
pub use types::{Account, AccountNature, AccountTreeNode, AccountType};
pub use validation::{validate_code, validate_nature};
