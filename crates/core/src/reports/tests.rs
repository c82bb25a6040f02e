//! Tests for report generation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::account::{AccountNature, AccountType};
use crate::ledger::{BalancePair, LedgerBalance, roll_forward};

use super::service::ReportService;
use super::types::ReportAccount;

fn make_account(
    code: &str,
    parent: Option<&ReportAccount>,
    account_type: AccountType,
) -> ReportAccount {
    ReportAccount {
        id: Uuid::new_v4(),
        parent_id: parent.map(|p| p.id),
        code: code.to_string(),
        name: format!("Account {code}"),
        level: parent.map_or(1, |p| p.level + 1),
        account_type,
        nature: account_type.default_nature(),
        is_control: parent.is_none(),
        sort_order: 0,
    }
}

fn make_balance(account: &ReportAccount, period: BalancePair) -> LedgerBalance {
    LedgerBalance {
        account_id: account.id,
        fiscal_year: 2024,
        fiscal_month: 1,
        opening: BalancePair::ZERO,
        period,
        closing: roll_forward(account.nature, BalancePair::ZERO, period),
    }
}

#[test]
fn test_trial_balance_scenario() {
    // Cash 1,000,000 debit against Sales 1,000,000 credit.
    let cash = make_account("1001", None, AccountType::Asset);
    let sales = make_account("4001", None, AccountType::Revenue);
    let accounts = vec![cash.clone(), sales.clone()];

    let mut balances = HashMap::new();
    balances.insert(
        cash.id,
        make_balance(&cash, BalancePair::new(dec!(1000000), Decimal::ZERO)),
    );
    balances.insert(
        sales.id,
        make_balance(&sales, BalancePair::new(Decimal::ZERO, dec!(1000000))),
    );

    let report = ReportService::generate_trial_balance(&accounts, &balances, 2024, 1);

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.totals.period.debit, dec!(1000000));
    assert_eq!(report.totals.period.credit, dec!(1000000));
    assert!(report.totals.is_balanced);
}

#[test]
fn test_trial_balance_parent_rows_aggregate_subtree() {
    let root = make_account("1000", None, AccountType::Asset);
    let cash = make_account("1001", Some(&root), AccountType::Asset);
    let bank = make_account("1002", Some(&root), AccountType::Asset);
    let sales = make_account("4001", None, AccountType::Revenue);
    let accounts = vec![root.clone(), cash.clone(), bank.clone(), sales.clone()];

    let mut balances = HashMap::new();
    balances.insert(
        cash.id,
        make_balance(&cash, BalancePair::new(dec!(300), Decimal::ZERO)),
    );
    balances.insert(
        bank.id,
        make_balance(&bank, BalancePair::new(dec!(700), Decimal::ZERO)),
    );
    balances.insert(
        sales.id,
        make_balance(&sales, BalancePair::new(Decimal::ZERO, dec!(1000))),
    );

    let report = ReportService::generate_trial_balance(&accounts, &balances, 2024, 1);

    // Depth-first: root, its children, then sales.
    let codes: Vec<&str> = report.rows.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "1001", "1002", "4001"]);

    let root_row = &report.rows[0];
    assert!(root_row.is_subtotal);
    assert_eq!(root_row.period.debit, dec!(1000));
    assert_eq!(root_row.closing.debit, dec!(1000));

    // Grand totals count the subtree once, via the root row.
    assert_eq!(report.totals.period.debit, dec!(1000));
    assert_eq!(report.totals.period.credit, dec!(1000));
    assert!(report.totals.is_balanced);
}

#[test]
fn test_trial_balance_unbalanced_detected() {
    let cash = make_account("1001", None, AccountType::Asset);
    let accounts = vec![cash.clone()];
    let mut balances = HashMap::new();
    balances.insert(
        cash.id,
        make_balance(&cash, BalancePair::new(dec!(500), Decimal::ZERO)),
    );

    let report = ReportService::generate_trial_balance(&accounts, &balances, 2024, 1);
    assert!(!report.totals.is_balanced);
}

#[test]
fn test_balance_sheet_balances_with_current_earnings() {
    let cash = make_account("1001", None, AccountType::Asset);
    let loan = make_account("2001", None, AccountType::Liability);
    let capital = make_account("3001", None, AccountType::Equity);
    let sales = make_account("4001", None, AccountType::Revenue);
    let rent = make_account("5001", None, AccountType::Expense);
    let accounts = vec![
        cash.clone(),
        loan.clone(),
        capital.clone(),
        sales.clone(),
        rent.clone(),
    ];

    // Capital 5000 + loan 2000 in cash, sales 3000, rent 1000.
    let mut balances = HashMap::new();
    balances.insert(
        cash.id,
        make_balance(&cash, BalancePair::new(dec!(9000), Decimal::ZERO)),
    );
    balances.insert(
        loan.id,
        make_balance(&loan, BalancePair::new(Decimal::ZERO, dec!(2000))),
    );
    balances.insert(
        capital.id,
        make_balance(&capital, BalancePair::new(Decimal::ZERO, dec!(5000))),
    );
    balances.insert(
        sales.id,
        make_balance(&sales, BalancePair::new(Decimal::ZERO, dec!(3000))),
    );
    balances.insert(
        rent.id,
        make_balance(&rent, BalancePair::new(dec!(1000), Decimal::ZERO)),
    );

    let as_of = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let report = ReportService::generate_balance_sheet(&accounts, &balances, as_of);

    assert_eq!(report.total_assets, dec!(9000));
    assert_eq!(report.total_liabilities, dec!(2000));
    // Capital 5000 plus derived current year earnings 2000.
    assert_eq!(report.total_equity, dec!(7000));
    assert!(report.is_balanced);
    assert!(
        report
            .equity
            .rows
            .iter()
            .any(|r| r.name == "Current year earnings" && r.amount == dec!(2000))
    );
}

#[test]
fn test_income_statement() {
    let sales = make_account("4001", None, AccountType::Revenue);
    let other = make_account("4002", None, AccountType::Revenue);
    let rent = make_account("5001", None, AccountType::Expense);
    let accounts = vec![sales.clone(), other.clone(), rent.clone()];

    let mut movements = HashMap::new();
    movements.insert(sales.id, BalancePair::new(Decimal::ZERO, dec!(3000)));
    movements.insert(other.id, BalancePair::new(dec!(200), dec!(700)));
    movements.insert(rent.id, BalancePair::new(dec!(1000), Decimal::ZERO));

    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    let report = ReportService::generate_income_statement(&accounts, &movements, from, to);

    assert_eq!(report.revenue.total, dec!(3500));
    assert_eq!(report.expenses.total, dec!(1000));
    assert_eq!(report.net_income, dec!(2500));
    // Rows sorted by code.
    assert_eq!(report.revenue.rows[0].code, "4001");
    assert_eq!(report.revenue.rows[1].code, "4002");
}

#[test]
fn test_income_statement_ignores_balance_sheet_accounts() {
    let cash = make_account("1001", None, AccountType::Asset);
    let accounts = vec![cash.clone()];
    let mut movements = HashMap::new();
    movements.insert(cash.id, BalancePair::new(dec!(1000), Decimal::ZERO));

    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let report = ReportService::generate_income_statement(&accounts, &movements, from, from);

    assert!(report.revenue.rows.is_empty());
    assert!(report.expenses.rows.is_empty());
    assert_eq!(report.net_income, Decimal::ZERO);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of balanced period movements, the trial balance totals
    /// report balanced.
    #[test]
    fn prop_trial_balance_balanced_for_balanced_postings(
        amounts in prop::collection::vec(1i64..1_000_000i64, 1..10),
    ) {
        let mut accounts = Vec::new();
        let mut balances = HashMap::new();

        for (i, cents) in amounts.iter().enumerate() {
            let amount = Decimal::new(*cents, 2);
            let debit_account =
                make_account(&format!("1{i:03}"), None, AccountType::Asset);
            let credit_account =
                make_account(&format!("4{i:03}"), None, AccountType::Revenue);
            balances.insert(
                debit_account.id,
                make_balance(&debit_account, BalancePair::new(amount, Decimal::ZERO)),
            );
            balances.insert(
                credit_account.id,
                make_balance(&credit_account, BalancePair::new(Decimal::ZERO, amount)),
            );
            accounts.push(debit_account);
            accounts.push(credit_account);
        }

        let report = ReportService::generate_trial_balance(&accounts, &balances, 2024, 1);
        prop_assert!(report.totals.is_balanced);
        prop_assert_eq!(report.totals.period.debit, report.totals.period.credit);
    }
}

#[test]
fn test_nature_signing_on_statements() {
    // A credit movement on a debit-nature account shows as negative.
    let cash = make_account("1001", None, AccountType::Asset);
    let pair = BalancePair::new(Decimal::ZERO, dec!(100));
    assert_eq!(pair.net(AccountNature::Debit), dec!(-100));
    assert_eq!(pair.net(cash.nature), dec!(-100));
}
