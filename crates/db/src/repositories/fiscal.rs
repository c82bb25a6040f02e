//! Fiscal period repository: period generation, closing, year-end close.
//!
//! Closing locks the period row `FOR UPDATE`, the same serialization point
//! the posting processor takes, so a close and a posting against one period
//! can never interleave.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use kassa_core::closing::{ClosingBalance, ClosingError, build_closing_entries, validate_retained_earnings};
use kassa_core::fiscal::PeriodKey;
use kassa_shared::ErrorKind;

use crate::entities::{
    accounts, fiscal_periods, ledger_balances, sea_orm_active_enums, vouchers,
};

use super::posting::{PostingError, PostingRepository};
use super::voucher::insert_entries;

/// Error types for fiscal period operations.
#[derive(Debug, thiserror::Error)]
pub enum FiscalRepoError {
    /// No period row exists for (company, year, month).
    #[error("Fiscal period {year}-{month:02} not found")]
    PeriodNotFound {
        /// Fiscal year.
        year: i32,
        /// Fiscal month.
        month: u32,
    },

    /// The period is already closed.
    #[error("Fiscal period {year}-{month:02} is already closed")]
    PeriodAlreadyClosed {
        /// Fiscal year.
        year: i32,
        /// Fiscal month.
        month: u32,
    },

    /// Earlier periods must be closed first.
    #[error("Cannot close {year}-{month:02}: earlier periods are still open")]
    EarlierPeriodsOpen {
        /// Fiscal year of the period being closed.
        year: i32,
        /// Fiscal month of the period being closed.
        month: u32,
    },

    /// Non-terminal vouchers block the close; every blocker is listed.
    #[error("Cannot close period: {} vouchers are not finalized", voucher_ids.len())]
    OpenVouchers {
        /// Every voucher still in draft, pending or approved status.
        voucher_ids: Vec<Uuid>,
    },

    /// The designated retained earnings account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A closing rule failed.
    #[error(transparent)]
    Closing(#[from] ClosingError),

    /// The closing voucher failed to post.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl FiscalRepoError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PeriodNotFound { .. } | Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::PeriodAlreadyClosed { .. }
            | Self::EarlierPeriodsOpen { .. }
            | Self::OpenVouchers { .. } => ErrorKind::StateConflict,
            Self::Closing(e) => e.kind(),
            Self::Posting(e) => e.kind(),
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

/// Fiscal period repository and closing coordinator.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ensures the twelve calendar-month period rows of a year exist,
    /// creating any missing ones as open.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn ensure_periods(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
    ) -> Result<Vec<fiscal_periods::Model>, FiscalRepoError> {
        let mut periods = Vec::with_capacity(12);
        for key in PeriodKey::months_of_year(fiscal_year) {
            let month = i32::try_from(key.month).unwrap_or_default();
            let existing = fiscal_periods::Entity::find()
                .filter(fiscal_periods::Column::CompanyId.eq(company_id))
                .filter(fiscal_periods::Column::FiscalYear.eq(key.year))
                .filter(fiscal_periods::Column::FiscalMonth.eq(month))
                .one(&self.db)
                .await?;

            let period = match existing {
                Some(period) => period,
                None => {
                    let now = chrono::Utc::now().into();
                    let row = fiscal_periods::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        company_id: Set(company_id),
                        fiscal_year: Set(key.year),
                        fiscal_month: Set(month),
                        name: Set(key.label()),
                        start_date: Set(key.start_date()),
                        end_date: Set(key.end_date()),
                        status: Set(sea_orm_active_enums::FiscalPeriodStatus::Open),
                        closed_by: Set(None),
                        closed_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    row.insert(&self.db).await?
                }
            };
            periods.push(period);
        }
        Ok(periods)
    }

    /// Finds a period by (company, year, month).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
        fiscal_month: u32,
    ) -> Result<Option<fiscal_periods::Model>, FiscalRepoError> {
        let month = i32::try_from(fiscal_month).unwrap_or_default();
        let period = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
            .filter(fiscal_periods::Column::FiscalMonth.eq(month))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Closes a fiscal period.
    ///
    /// Every voucher dated inside the period must already be terminal
    /// (posted, cancelled or rejected); any draft, pending or approved
    /// voucher blocks the close and is reported by id. Earlier periods of
    /// the company must be closed first so carried openings are final.
    ///
    /// # Errors
    ///
    /// Returns `OpenVouchers` listing every blocker, or a state conflict if
    /// the period is already closed or an earlier period is open.
    pub async fn close_period(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
        fiscal_month: u32,
        closed_by: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalRepoError> {
        let txn = self.db.begin().await?;
        let period =
            close_period_in_txn(&txn, company_id, fiscal_year, fiscal_month, closed_by).await?;
        txn.commit().await?;

        tracing::info!(
            company_id = %company_id,
            fiscal_year,
            fiscal_month,
            closed_by = %closed_by,
            "closed fiscal period"
        );
        Ok(period)
    }

    /// Performs the year-end close.
    ///
    /// Closes the final period of the year if still open, then builds and
    /// posts the closing voucher that zeroes every revenue and expense
    /// account into the retained earnings account, so only balance-sheet
    /// balances carry into the next fiscal year. Returns `None` when there
    /// is no profit-and-loss activity to close.
    ///
    /// # Errors
    ///
    /// Returns an error if the retained earnings account is missing or not
    /// equity, if open vouchers block the final period close, or if the
    /// closing voucher fails to post.
    pub async fn year_end_close(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
        retained_earnings_account_id: Uuid,
        closed_by: Uuid,
    ) -> Result<Option<vouchers::Model>, FiscalRepoError> {
        let txn = self.db.begin().await?;

        let retained = accounts::Entity::find_by_id(retained_earnings_account_id)
            .filter(accounts::Column::CompanyId.eq(company_id))
            .one(&txn)
            .await?
            .ok_or(FiscalRepoError::AccountNotFound(retained_earnings_account_id))?;
        validate_retained_earnings(retained.id, retained.account_type.into())?;

        // Close December first (which requires January..November closed).
        let final_month = 12u32;
        let final_period = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
            .filter(fiscal_periods::Column::FiscalMonth.eq(12))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(FiscalRepoError::PeriodNotFound {
                year: fiscal_year,
                month: final_month,
            })?;
        if final_period.status == sea_orm_active_enums::FiscalPeriodStatus::Open {
            close_period_in_txn(&txn, company_id, fiscal_year, final_month, closed_by).await?;
        }

        // Year-end closing balances of every P&L account.
        let balances = year_closing_balances(&txn, company_id, fiscal_year).await?;
        let entries = build_closing_entries(&balances, retained_earnings_account_id);
        if entries.is_empty() {
            txn.commit().await?;
            return Ok(None);
        }

        let total_debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = entries.iter().map(|e| e.credit).sum();
        let closing_date = PeriodKey {
            year: fiscal_year,
            month: final_month,
        }
        .end_date();

        let now = chrono::Utc::now().into();
        let voucher_id = Uuid::new_v4();
        let voucher = vouchers::ActiveModel {
            id: Set(voucher_id),
            company_id: Set(company_id),
            fiscal_period_id: Set(final_period.id),
            voucher_no: Set(None),
            voucher_type: Set(sea_orm_active_enums::VoucherType::Closing),
            voucher_date: Set(closing_date),
            description: Set(format!("Year-end close {fiscal_year}")),
            reference: Set(None),
            status: Set(sea_orm_active_enums::VoucherStatus::Approved),
            total_debit: Set(total_debit),
            total_credit: Set(total_credit),
            reversal_of: Set(None),
            created_by: Set(closed_by),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(Some(closed_by)),
            approved_at: Set(Some(now)),
            posted_by: Set(None),
            posted_at: Set(None),
            rejection_reason: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        voucher.insert(&txn).await?;
        insert_entries(&txn, voucher_id, &entries).await?;

        // The closing voucher is the one posting allowed into the
        // just-closed final period.
        let posted = PostingRepository::post_in_txn(
            &txn,
            company_id,
            voucher_id,
            closed_by,
            super::posting::PostingMode::YearEndClosing,
        )
        .await?;

        txn.commit().await?;

        tracing::info!(
            company_id = %company_id,
            fiscal_year,
            closing_voucher = %voucher_id,
            "year-end close completed"
        );
        Ok(Some(posted))
    }
}

/// Closes one period inside the caller's transaction.
async fn close_period_in_txn(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    fiscal_year: i32,
    fiscal_month: u32,
    closed_by: Uuid,
) -> Result<fiscal_periods::Model, FiscalRepoError> {
    let month = i32::try_from(fiscal_month).unwrap_or_default();

    // The period row is the serialization point shared with posting.
    let period = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::CompanyId.eq(company_id))
        .filter(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
        .filter(fiscal_periods::Column::FiscalMonth.eq(month))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(FiscalRepoError::PeriodNotFound {
            year: fiscal_year,
            month: fiscal_month,
        })?;

    if period.status == sea_orm_active_enums::FiscalPeriodStatus::Closed {
        return Err(FiscalRepoError::PeriodAlreadyClosed {
            year: fiscal_year,
            month: fiscal_month,
        });
    }

    let earlier_open = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::CompanyId.eq(company_id))
        .filter(fiscal_periods::Column::Status.eq(sea_orm_active_enums::FiscalPeriodStatus::Open))
        .filter(
            Condition::any()
                .add(fiscal_periods::Column::FiscalYear.lt(fiscal_year))
                .add(
                    Condition::all()
                        .add(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
                        .add(fiscal_periods::Column::FiscalMonth.lt(month)),
                ),
        )
        .one(txn)
        .await?;
    if earlier_open.is_some() {
        return Err(FiscalRepoError::EarlierPeriodsOpen {
            year: fiscal_year,
            month: fiscal_month,
        });
    }

    // Every voucher dated inside the period must be terminal.
    let blockers: Vec<Uuid> = vouchers::Entity::find()
        .filter(vouchers::Column::CompanyId.eq(company_id))
        .filter(vouchers::Column::VoucherDate.between(period.start_date, period.end_date))
        .filter(vouchers::Column::Status.is_in([
            sea_orm_active_enums::VoucherStatus::Draft,
            sea_orm_active_enums::VoucherStatus::Pending,
            sea_orm_active_enums::VoucherStatus::Approved,
        ]))
        .order_by_asc(vouchers::Column::CreatedAt)
        .all(txn)
        .await?
        .into_iter()
        .map(|v| v.id)
        .collect();
    if !blockers.is_empty() {
        return Err(FiscalRepoError::OpenVouchers {
            voucher_ids: blockers,
        });
    }

    let now = chrono::Utc::now().into();
    let mut active: fiscal_periods::ActiveModel = period.into();
    active.status = Set(sea_orm_active_enums::FiscalPeriodStatus::Closed);
    active.closed_by = Set(Some(closed_by));
    active.closed_at = Set(Some(now));
    active.updated_at = Set(now);

    let updated = active.update(txn).await?;
    Ok(updated)
}

/// Latest-per-account closing balances of a fiscal year, joined with the
/// account types the closing service needs.
async fn year_closing_balances(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    fiscal_year: i32,
) -> Result<Vec<ClosingBalance>, FiscalRepoError> {
    let rows = ledger_balances::Entity::find()
        .filter(ledger_balances::Column::CompanyId.eq(company_id))
        .filter(ledger_balances::Column::FiscalYear.eq(fiscal_year))
        .order_by_asc(ledger_balances::Column::FiscalMonth)
        .all(txn)
        .await?;

    // Ascending month order: the last row per account is the year-end one.
    let mut latest: HashMap<Uuid, ledger_balances::Model> = HashMap::new();
    for row in rows {
        latest.insert(row.account_id, row);
    }

    let account_ids: Vec<Uuid> = latest.keys().copied().collect();
    let account_rows = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(account_ids))
        .all(txn)
        .await?;
    let types: HashMap<Uuid, sea_orm_active_enums::AccountType> =
        account_rows.into_iter().map(|a| (a.id, a.account_type)).collect();

    let mut balances = Vec::with_capacity(latest.len());
    for (account_id, row) in latest {
        let Some(account_type) = types.get(&account_id) else {
            continue;
        };
        balances.push(ClosingBalance {
            account_id,
            account_type: (*account_type).into(),
            closing_debit: row.closing_debit,
            closing_credit: row.closing_credit,
        });
    }
    Ok(balances)
}
