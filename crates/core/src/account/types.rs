//! Account domain types.

use serde::{Deserialize, Serialize};
use kassa_shared::types::{AccountId, CompanyId};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (cash, receivables, inventory).
    Asset,
    /// Liability account (payables, loans).
    Liability,
    /// Equity account (capital, retained earnings).
    Equity,
    /// Revenue account.
    Revenue,
    /// Expense account.
    Expense,
}

impl AccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Returns the side on which this account type normally carries its
    /// balance: assets and expenses are debit-normal, the rest credit-normal.
    #[must_use]
    pub const fn default_nature(&self) -> AccountNature {
        match self {
            Self::Asset | Self::Expense => AccountNature::Debit,
            Self::Liability | Self::Equity | Self::Revenue => AccountNature::Credit,
        }
    }

    /// Returns true for revenue and expense accounts, which are zeroed out
    /// at year-end close.
    #[must_use]
    pub const fn is_profit_and_loss(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side that increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Debit-normal: debits increase the balance.
    Debit,
    /// Credit-normal: credits increase the balance.
    Credit,
}

impl AccountNature {
    /// Returns the string representation of the nature.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for AccountNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Company this account belongs to.
    pub company_id: CompanyId,
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Parent account, if any.
    pub parent_id: Option<AccountId>,
    /// Depth in the tree; root accounts are level 1.
    pub level: i16,
    /// Materialized path of ancestor codes joined with `/`, ending in this
    /// account's own code.
    pub path: String,
    /// Account classification.
    pub account_type: AccountType,
    /// The side that increases the balance.
    pub nature: AccountNature,
    /// Aggregation-only account; rejects direct postings.
    pub is_control: bool,
    /// Whether entries may post directly to this account.
    pub allow_direct_posting: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Ordering among siblings.
    pub sort_order: i32,
}

/// An account with its children, as returned by tree listings.
#[derive(Debug, Clone, Serialize)]
pub struct AccountTreeNode {
    /// The account itself.
    pub account: Account,
    /// Child nodes, ordered by `sort_order` then code.
    pub children: Vec<AccountTreeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nature() {
        assert_eq!(AccountType::Asset.default_nature(), AccountNature::Debit);
        assert_eq!(AccountType::Expense.default_nature(), AccountNature::Debit);
        assert_eq!(
            AccountType::Liability.default_nature(),
            AccountNature::Credit
        );
        assert_eq!(AccountType::Equity.default_nature(), AccountNature::Credit);
        assert_eq!(AccountType::Revenue.default_nature(), AccountNature::Credit);
    }

    #[test]
    fn test_profit_and_loss() {
        assert!(AccountType::Revenue.is_profit_and_loss());
        assert!(AccountType::Expense.is_profit_and_loss());
        assert!(!AccountType::Asset.is_profit_and_loss());
        assert!(!AccountType::Liability.is_profit_and_loss());
        assert!(!AccountType::Equity.is_profit_and_loss());
    }

    #[test]
    fn test_display() {
        assert_eq!(AccountType::Asset.to_string(), "asset");
        assert_eq!(AccountNature::Credit.to_string(), "credit");
    }
}
