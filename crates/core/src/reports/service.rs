//! Report generation service.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::AccountType;
use crate::ledger::{BalancePair, LedgerBalance};

use super::types::{
    BalanceSheetReport, IncomeStatementReport, ReportAccount, StatementRow, StatementSection,
    TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};

/// Tolerance for debit/credit equality checks on report totals.
pub const ROUNDING_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Aggregated balance triple for one account (possibly with its subtree).
#[derive(Debug, Clone, Copy, Default)]
struct BalanceTriple {
    opening: BalancePair,
    period: BalancePair,
    closing: BalancePair,
}

impl BalanceTriple {
    fn add(&mut self, other: &Self) {
        self.opening.accumulate(other.opening.debit, other.opening.credit);
        self.period.accumulate(other.period.debit, other.period.credit);
        self.closing.accumulate(other.closing.debit, other.closing.credit);
    }

    fn from_balance(balance: &LedgerBalance) -> Self {
        Self {
            opening: balance.opening,
            period: balance.period,
            closing: balance.closing,
        }
    }
}

fn pair_balanced(pair: BalancePair) -> bool {
    (pair.debit - pair.credit).abs() <= ROUNDING_EPSILON
}

/// Service for generating financial reports.
///
/// All methods are pure: they consume account rows and balance rows loaded
/// by the caller and never touch storage.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance for one fiscal period.
    ///
    /// Rows come out in depth-first tree order; parent rows aggregate their
    /// subtree (the per-level subtotals), and the grand totals sum the root
    /// rows so every account is counted exactly once.
    #[must_use]
    pub fn generate_trial_balance(
        accounts: &[ReportAccount],
        balances: &HashMap<Uuid, LedgerBalance>,
        fiscal_year: i32,
        fiscal_month: u32,
    ) -> TrialBalanceReport {
        let order = tree_order(accounts);
        let mut rows = Vec::with_capacity(accounts.len());
        let mut totals = BalanceTriple::default();

        for &idx in &order.roots {
            let aggregate = emit_rows(accounts, &order.children, balances, idx, &mut rows);
            totals.add(&aggregate);
        }

        let is_balanced = pair_balanced(totals.opening)
            && pair_balanced(totals.period)
            && pair_balanced(totals.closing);

        TrialBalanceReport {
            fiscal_year,
            fiscal_month,
            rows,
            totals: TrialBalanceTotals {
                opening: totals.opening,
                period: totals.period,
                closing: totals.closing,
                is_balanced,
            },
        }
    }

    /// Generates a balance sheet from closing balances.
    ///
    /// Only accounts that carry their own balance rows contribute, so
    /// control accounts never double-count. Before a year-end close the
    /// accumulated P&L net is surfaced as a derived "Current year earnings"
    /// equity line so the statement still balances.
    #[must_use]
    pub fn generate_balance_sheet(
        accounts: &[ReportAccount],
        balances: &HashMap<Uuid, LedgerBalance>,
        as_of: NaiveDate,
    ) -> BalanceSheetReport {
        let mut assets = StatementSection::default();
        let mut liabilities = StatementSection::default();
        let mut equity = StatementSection::default();
        let mut current_earnings = Decimal::ZERO;

        let mut sorted: Vec<&ReportAccount> = accounts.iter().collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));

        for account in sorted {
            let Some(balance) = balances.get(&account.id) else {
                continue;
            };
            let amount = balance.closing.net(account.nature);
            if amount.is_zero() {
                continue;
            }
            match account.account_type {
                AccountType::Asset => push_row(&mut assets, account, amount),
                AccountType::Liability => push_row(&mut liabilities, account, amount),
                AccountType::Equity => push_row(&mut equity, account, amount),
                AccountType::Revenue => current_earnings += amount,
                AccountType::Expense => current_earnings -= amount,
            }
        }

        if !current_earnings.is_zero() {
            equity.total += current_earnings;
            equity.rows.push(StatementRow {
                account_id: Uuid::nil(),
                code: String::new(),
                name: "Current year earnings".to_string(),
                level: 1,
                amount: current_earnings,
            });
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: (total_assets - liabilities_and_equity).abs() <= ROUNDING_EPSILON,
        }
    }

    /// Generates an income statement from period movements.
    ///
    /// `movements` holds each account's debit/credit sums over the covered
    /// months; amounts are signed toward each account's nature.
    #[must_use]
    pub fn generate_income_statement(
        accounts: &[ReportAccount],
        movements: &HashMap<Uuid, BalancePair>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> IncomeStatementReport {
        let mut revenue = StatementSection::default();
        let mut expenses = StatementSection::default();

        let mut sorted: Vec<&ReportAccount> = accounts.iter().collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));

        for account in sorted {
            let Some(movement) = movements.get(&account.id) else {
                continue;
            };
            let amount = movement.net(account.nature);
            if amount.is_zero() {
                continue;
            }
            match account.account_type {
                AccountType::Revenue => push_row(&mut revenue, account, amount),
                AccountType::Expense => push_row(&mut expenses, account, amount),
                _ => {}
            }
        }

        let net_income = revenue.total - expenses.total;

        IncomeStatementReport {
            period_start,
            period_end,
            revenue,
            expenses,
            net_income,
        }
    }
}

fn push_row(section: &mut StatementSection, account: &ReportAccount, amount: Decimal) {
    section.total += amount;
    section.rows.push(StatementRow {
        account_id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        level: account.level,
        amount,
    });
}

/// Sibling-sorted tree indices over a flat account slice.
struct TreeOrder {
    roots: Vec<usize>,
    children: HashMap<Uuid, Vec<usize>>,
}

fn tree_order(accounts: &[ReportAccount]) -> TreeOrder {
    let present: HashMap<Uuid, usize> =
        accounts.iter().enumerate().map(|(i, a)| (a.id, i)).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();

    for (idx, account) in accounts.iter().enumerate() {
        match account.parent_id.filter(|pid| present.contains_key(pid)) {
            Some(pid) => children.entry(pid).or_default().push(idx),
            None => roots.push(idx),
        }
    }

    let sort = |indices: &mut Vec<usize>| {
        indices.sort_by(|&a, &b| {
            accounts[a]
                .sort_order
                .cmp(&accounts[b].sort_order)
                .then_with(|| accounts[a].code.cmp(&accounts[b].code))
        });
    };
    sort(&mut roots);
    for indices in children.values_mut() {
        sort(indices);
    }

    TreeOrder { roots, children }
}

/// Emits the subtree rooted at `idx` in pre-order, returning its aggregate.
fn emit_rows(
    accounts: &[ReportAccount],
    children: &HashMap<Uuid, Vec<usize>>,
    balances: &HashMap<Uuid, LedgerBalance>,
    idx: usize,
    rows: &mut Vec<TrialBalanceRow>,
) -> BalanceTriple {
    let account = &accounts[idx];
    let mut aggregate = balances
        .get(&account.id)
        .map(BalanceTriple::from_balance)
        .unwrap_or_default();

    // Reserve the row slot so parents precede children in the output.
    let row_idx = rows.len();
    let child_indices = children.get(&account.id);
    rows.push(TrialBalanceRow {
        account_id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        level: account.level,
        is_subtotal: child_indices.is_some_and(|c| !c.is_empty()),
        opening: BalancePair::ZERO,
        period: BalancePair::ZERO,
        closing: BalancePair::ZERO,
    });

    if let Some(child_indices) = child_indices {
        for &child in child_indices {
            let child_aggregate = emit_rows(accounts, children, balances, child, rows);
            aggregate.add(&child_aggregate);
        }
    }

    rows[row_idx].opening = aggregate.opening;
    rows[row_idx].period = aggregate.period;
    rows[row_idx].closing = aggregate.closing;

    aggregate
}
