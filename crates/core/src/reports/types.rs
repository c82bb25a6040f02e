//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::{AccountNature, AccountType};
use crate::ledger::BalancePair;

/// Account row as needed by report generation.
#[derive(Debug, Clone)]
pub struct ReportAccount {
    /// Account ID.
    pub id: Uuid,
    /// Parent account ID, if any.
    pub parent_id: Option<Uuid>,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Depth in the tree; roots are level 1.
    pub level: i16,
    /// Account classification.
    pub account_type: AccountType,
    /// Balance side.
    pub nature: AccountNature,
    /// Aggregation-only account.
    pub is_control: bool,
    /// Sibling ordering.
    pub sort_order: i32,
}

/// One row of a trial balance: an account with its (possibly aggregated)
/// opening, period and closing columns.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Tree level; rows above leaves carry subtree subtotals.
    pub level: i16,
    /// True for control/parent rows whose amounts aggregate the subtree.
    pub is_subtotal: bool,
    /// Opening balance columns.
    pub opening: BalancePair,
    /// Period movement columns.
    pub period: BalancePair,
    /// Closing balance columns.
    pub closing: BalancePair,
}

/// Grand totals of a trial balance.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceTotals {
    /// Total opening columns.
    pub opening: BalancePair,
    /// Total period columns.
    pub period: BalancePair,
    /// Total closing columns.
    pub closing: BalancePair,
    /// Whether every column pair balances within the rounding epsilon.
    pub is_balanced: bool,
}

/// Trial balance report for one fiscal period.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceReport {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal month.
    pub fiscal_month: u32,
    /// Rows in depth-first tree order.
    pub rows: Vec<TrialBalanceRow>,
    /// Grand totals over the root rows.
    pub totals: TrialBalanceTotals,
}

/// One account line on a financial statement.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRow {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Tree level.
    pub level: i16,
    /// Amount signed toward the account's nature.
    pub amount: Decimal,
}

/// A statement section with its total.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatementSection {
    /// Section total.
    pub total: Decimal,
    /// Rows in the section.
    pub rows: Vec<StatementRow>,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheetReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: StatementSection,
    /// Liabilities section.
    pub liabilities: StatementSection,
    /// Equity section.
    pub equity: StatementSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity within epsilon.
    pub is_balanced: bool,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatementReport {
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Revenue section.
    pub revenue: StatementSection,
    /// Expense section.
    pub expenses: StatementSection,
    /// Net income (revenue minus expenses).
    pub net_income: Decimal,
}

/// One posted entry in an account ledger listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedgerRow {
    /// The voucher the entry belongs to.
    pub voucher_id: Uuid,
    /// Voucher number within its series.
    pub voucher_no: i64,
    /// Voucher date.
    pub voucher_date: NaiveDate,
    /// Line or voucher description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance after this entry, signed toward the account's nature.
    pub running_balance: Decimal,
}
