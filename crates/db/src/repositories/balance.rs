//! Ledger balance repository: balance reads and the audited rebuild.
//!
//! The posting processor maintains balances incrementally; this repository
//! only reads them, except for `recalculate_balances`, the explicit repair
//! command for out-of-order posting into open prior periods.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use kassa_core::account::AccountNature;
use kassa_core::fiscal::PeriodKey;
use kassa_core::ledger::{BalancePair, LedgerBalance, carry_opening};
use kassa_shared::ErrorKind;

use crate::entities::{
    accounts, fiscal_periods, ledger_balances, sea_orm_active_enums, voucher_entries, vouchers,
};

use super::posting::latest_prior_closing;

/// Error types for balance operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceRepoError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BalanceRepoError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

/// Ledger balance repository.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the balance row for (account, year, month), if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_balance(
        &self,
        account_id: Uuid,
        fiscal_year: i32,
        fiscal_month: u32,
    ) -> Result<Option<LedgerBalance>, BalanceRepoError> {
        let month = i32::try_from(fiscal_month).unwrap_or_default();
        let row = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::AccountId.eq(account_id))
            .filter(ledger_balances::Column::FiscalYear.eq(fiscal_year))
            .filter(ledger_balances::Column::FiscalMonth.eq(month))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.to_core()))
    }

    /// Returns each account's latest balance row of the fiscal year - the
    /// year-end closing balances used by the closing coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn year_end_balances(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
    ) -> Result<HashMap<Uuid, LedgerBalance>, BalanceRepoError> {
        let rows = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::CompanyId.eq(company_id))
            .filter(ledger_balances::Column::FiscalYear.eq(fiscal_year))
            .order_by_asc(ledger_balances::Column::FiscalMonth)
            .all(&self.db)
            .await?;

        // Ascending month order: the last row seen per account wins.
        let mut latest = HashMap::new();
        for row in rows {
            latest.insert(row.account_id, row.to_core());
        }
        Ok(latest)
    }

    /// Rebuilds the opening/period/closing chain of a fiscal year from the
    /// posted entries. This is the explicit, audited repair command after
    /// out-of-order posting; ordinary forward posting never needs it.
    ///
    /// Returns the number of balance rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn recalculate_balances(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
        requested_by: Uuid,
    ) -> Result<u64, BalanceRepoError> {
        tracing::warn!(
            company_id = %company_id,
            fiscal_year,
            requested_by = %requested_by,
            "recalculating ledger balances"
        );

        let txn = self.db.begin().await?;

        // Serialize against concurrent posting into the year.
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
            .lock_exclusive()
            .all(&txn)
            .await?;

        let start = NaiveDate::from_ymd_opt(fiscal_year, 1, 1);
        let end = NaiveDate::from_ymd_opt(fiscal_year, 12, 31);
        let (Some(start), Some(end)) = (start, end) else {
            txn.commit().await?;
            return Ok(0);
        };

        // Posted movements grouped by (account, month).
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct EntryRow {
            account_id: Uuid,
            debit: rust_decimal::Decimal,
            credit: rust_decimal::Decimal,
            voucher_date: NaiveDate,
        }

        let rows: Vec<EntryRow> = voucher_entries::Entity::find()
            .select_only()
            .column(voucher_entries::Column::AccountId)
            .column(voucher_entries::Column::Debit)
            .column(voucher_entries::Column::Credit)
            .column(vouchers::Column::VoucherDate)
            .join(JoinType::InnerJoin, voucher_entries::Relation::Vouchers.def())
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .filter(vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Posted))
            .filter(vouchers::Column::VoucherDate.between(start, end))
            .into_model::<EntryRow>()
            .all(&txn)
            .await?;

        let mut movements: HashMap<Uuid, BTreeMap<u32, BalancePair>> = HashMap::new();
        for row in rows {
            let key = PeriodKey::from_date(row.voucher_date);
            movements
                .entry(row.account_id)
                .or_default()
                .entry(key.month)
                .or_default()
                .accumulate(row.debit, row.credit);
        }

        let natures = load_natures(&txn, movements.keys().copied().collect()).await?;

        // Replace the year's rows wholesale.
        ledger_balances::Entity::delete_many()
            .filter(ledger_balances::Column::CompanyId.eq(company_id))
            .filter(ledger_balances::Column::FiscalYear.eq(fiscal_year))
            .exec(&txn)
            .await?;

        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let mut written = 0u64;
        for (account_id, months) in movements {
            let nature = *natures
                .get(&account_id)
                .ok_or(BalanceRepoError::AccountNotFound(account_id))?;

            let january = PeriodKey { year: fiscal_year, month: 1 };
            let mut opening =
                carry_opening(latest_prior_closing(&txn, account_id, january).await?);

            for (month, movement) in months {
                let mut balance =
                    LedgerBalance::open(account_id, fiscal_year, month, opening);
                balance.apply_entry(nature, movement.debit, movement.credit);
                opening = balance.closing;

                let row = ledger_balances::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    company_id: Set(company_id),
                    account_id: Set(account_id),
                    fiscal_year: Set(fiscal_year),
                    fiscal_month: Set(i32::try_from(month).unwrap_or_default()),
                    opening_debit: Set(balance.opening.debit),
                    opening_credit: Set(balance.opening.credit),
                    period_debit: Set(balance.period.debit),
                    period_credit: Set(balance.period.credit),
                    closing_debit: Set(balance.closing.debit),
                    closing_credit: Set(balance.closing.credit),
                    updated_at: Set(now),
                };
                row.insert(&txn).await?;
                written += 1;
            }
        }

        txn.commit().await?;

        tracing::info!(
            company_id = %company_id,
            fiscal_year,
            rows = written,
            "ledger balances recalculated"
        );
        Ok(written)
    }
}

/// Loads the nature of each account in `ids`.
async fn load_natures<C: sea_orm::ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, AccountNature>, DbErr> {
    let rows = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|a| (a.id, a.nature.into())).collect())
}
