//! Posting processor: commits approved vouchers into the ledger.
//!
//! Posting runs as one transaction that (1) locks the voucher's fiscal
//! period row `FOR UPDATE`, the serialization point shared with period
//! closing, (2) draws the next voucher number from the durable sequence,
//! (3) flips the voucher approved -> posted with an optimistic check, and
//! (4) folds the entries into the per-period ledger balances. All steps
//! commit or roll back together; a failed posting leaves the voucher
//! `approved`.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use kassa_core::fiscal::PeriodKey;
use kassa_core::ledger::{BalancePair, LedgerBalance, carry_opening};
use kassa_core::voucher::{LifecycleService, VoucherError, VoucherStatus, reverse_entries};
use kassa_shared::ErrorKind;

use crate::entities::{
    accounts, fiscal_periods, ledger_balances, sea_orm_active_enums, voucher_sequences,
    voucher_entries, vouchers,
};

use super::voucher::{insert_entries, to_entry_input};

/// Error types for posting operations.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(Uuid),

    /// No fiscal period covers the voucher date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// The voucher is not in approved status.
    #[error("Voucher {voucher_id} is {status}, only approved vouchers can be posted")]
    NotApproved {
        /// The voucher.
        voucher_id: Uuid,
        /// Its current status.
        status: VoucherStatus,
    },

    /// The fiscal period is closed.
    #[error("Fiscal period {year}-{month:02} is closed, no posting allowed")]
    PeriodClosed {
        /// Fiscal year.
        year: i32,
        /// Fiscal month.
        month: u32,
    },

    /// A later period is already closed; backdated posting is not allowed
    /// past a closed boundary.
    #[error("Period {year}-{month:02} is already closed; backdated posting would corrupt carried balances")]
    LaterPeriodClosed {
        /// Fiscal year of the closed later period.
        year: i32,
        /// Fiscal month of the closed later period.
        month: u32,
    },

    /// An entry references an account that no longer exists.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A concurrent transition won the optimistic posted flip.
    #[error("Voucher {0} was modified concurrently, please retry")]
    TransitionConflict(Uuid),

    /// A lifecycle rule failed.
    #[error(transparent)]
    Lifecycle(#[from] VoucherError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PostingError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VoucherNotFound(_) | Self::NoFiscalPeriod(_) | Self::AccountNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::NotApproved { .. }
            | Self::PeriodClosed { .. }
            | Self::LaterPeriodClosed { .. } => ErrorKind::StateConflict,
            Self::TransitionConflict(_) => ErrorKind::ConcurrencyConflict,
            Self::Lifecycle(e) => e.kind(),
            Self::Database(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if retrying with fresh state can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// How the period check treats the target period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostingMode {
    /// Normal posting: the period must be open and no later period closed.
    Standard,
    /// Year-end closing voucher: posts into the just-closed final period.
    YearEndClosing,
}

/// Posting repository: the only writer of voucher numbers and ledger
/// balances.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts an approved voucher.
    ///
    /// # Errors
    ///
    /// Returns a state conflict if the period is closed (the voucher stays
    /// `approved`), or a retryable conflict if a concurrent writer touched
    /// the voucher.
    pub async fn post_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        posted_by: Uuid,
    ) -> Result<vouchers::Model, PostingError> {
        let txn = self.db.begin().await?;
        let posted =
            Self::post_in_txn(&txn, company_id, voucher_id, posted_by, PostingMode::Standard)
                .await?;
        txn.commit().await?;

        tracing::info!(
            voucher_id = %voucher_id,
            voucher_no = ?posted.voucher_no,
            "posted voucher"
        );
        Ok(posted)
    }

    /// Reverses a posted voucher: creates a new voucher at `reversal_date`
    /// with every line's debit/credit swapped and posts it through the
    /// standard posting path, all in one transaction. The reversal carries
    /// `reversal_of`; the original's `reversed_by` stays derived.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is not posted, already reversed, or
    /// the reversal date falls in a closed period.
    pub async fn reverse_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        reversal_date: NaiveDate,
        reversed_by_user: Uuid,
    ) -> Result<vouchers::Model, PostingError> {
        let txn = self.db.begin().await?;

        let original = vouchers::Entity::find_by_id(voucher_id)
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .one(&txn)
            .await?
            .ok_or(PostingError::VoucherNotFound(voucher_id))?;

        let existing_reversal = vouchers::Entity::find()
            .filter(vouchers::Column::ReversalOf.eq(voucher_id))
            .one(&txn)
            .await?
            .map(|r| r.id);
        LifecycleService::validate_reversible(
            voucher_id,
            original.status.into(),
            existing_reversal,
        )?;

        let original_entries = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(&txn)
            .await?;
        let inputs: Vec<_> = original_entries.iter().map(to_entry_input).collect();
        let reversed = reverse_entries(&inputs);

        let reversal_period = find_period_for_date(&txn, company_id, reversal_date)
            .await?
            .ok_or(PostingError::NoFiscalPeriod(reversal_date))?;

        // The reversal enters the machine directly in approved state and is
        // posted immediately; it keeps the original's type so it lands in
        // the same number series.
        let now = chrono::Utc::now().into();
        let reversal_id = Uuid::new_v4();
        let reversal = vouchers::ActiveModel {
            id: Set(reversal_id),
            company_id: Set(company_id),
            fiscal_period_id: Set(reversal_period.id),
            voucher_no: Set(None),
            voucher_type: Set(original.voucher_type),
            voucher_date: Set(reversal_date),
            description: Set(format!("Reversal of voucher {}", original.id)),
            reference: Set(original.reference.clone()),
            status: Set(sea_orm_active_enums::VoucherStatus::Approved),
            total_debit: Set(original.total_credit),
            total_credit: Set(original.total_debit),
            reversal_of: Set(Some(voucher_id)),
            created_by: Set(reversed_by_user),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(Some(reversed_by_user)),
            approved_at: Set(Some(now)),
            posted_by: Set(None),
            posted_at: Set(None),
            rejection_reason: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        reversal.insert(&txn).await?;
        insert_entries(&txn, reversal_id, &reversed).await?;

        let posted = Self::post_in_txn(
            &txn,
            company_id,
            reversal_id,
            reversed_by_user,
            PostingMode::Standard,
        )
        .await?;

        txn.commit().await?;

        tracing::info!(
            original = %voucher_id,
            reversal = %reversal_id,
            "reversed voucher"
        );
        Ok(posted)
    }

    /// Runs the five posting steps inside the caller's transaction.
    pub(crate) async fn post_in_txn(
        txn: &DatabaseTransaction,
        company_id: Uuid,
        voucher_id: Uuid,
        posted_by: Uuid,
        mode: PostingMode,
    ) -> Result<vouchers::Model, PostingError> {
        let voucher = vouchers::Entity::find_by_id(voucher_id)
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .one(txn)
            .await?
            .ok_or(PostingError::VoucherNotFound(voucher_id))?;

        let status: VoucherStatus = voucher.status.into();
        if status != VoucherStatus::Approved {
            return Err(PostingError::NotApproved { voucher_id, status });
        }

        // Step 1: lock the period row. Everything that touches this period
        // (posting, closing, balance upserts) serializes here.
        let period = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::StartDate.lte(voucher.voucher_date))
            .filter(fiscal_periods::Column::EndDate.gte(voucher.voucher_date))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(PostingError::NoFiscalPeriod(voucher.voucher_date))?;
        let key = period.key();

        if mode == PostingMode::Standard {
            if period.status == sea_orm_active_enums::FiscalPeriodStatus::Closed {
                return Err(PostingError::PeriodClosed {
                    year: key.year,
                    month: key.month,
                });
            }
            // Backdated postings stop at the closed frontier: once any later
            // period is closed its opening balances are final.
            if let Some(later) = find_later_closed_period(txn, company_id, key).await? {
                let later_key = later.key();
                return Err(PostingError::LaterPeriodClosed {
                    year: later_key.year,
                    month: later_key.month,
                });
            }
        }

        // Step 2: draw the next number from the durable sequence.
        let voucher_no = next_voucher_no(txn, company_id, voucher.voucher_type, key).await?;

        // Step 3: flip approved -> posted optimistically.
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let result = vouchers::Entity::update_many()
            .col_expr(
                vouchers::Column::Status,
                Expr::value(sea_orm_active_enums::VoucherStatus::Posted),
            )
            .col_expr(vouchers::Column::VoucherNo, Expr::value(voucher_no))
            .col_expr(vouchers::Column::PostedBy, Expr::value(posted_by))
            .col_expr(vouchers::Column::PostedAt, Expr::value(now))
            .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
            .filter(vouchers::Column::Id.eq(voucher_id))
            .filter(
                vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Approved),
            )
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(PostingError::TransitionConflict(voucher_id));
        }

        // Step 4: fold the entries into the period's ledger balances.
        let entries = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
            .all(txn)
            .await?;
        apply_entries_to_balances(txn, company_id, key, &entries).await?;

        // Step 5 happened with the flip: posted_by/posted_at are stamped.
        vouchers::Entity::find_by_id(voucher_id)
            .one(txn)
            .await?
            .ok_or(PostingError::VoucherNotFound(voucher_id))
    }
}

/// Accumulates entry amounts per account and upserts the (account, period)
/// balance rows. Runs under the period lock, so read-modify-write here is
/// race-free.
async fn apply_entries_to_balances(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    key: PeriodKey,
    entries: &[voucher_entries::Model],
) -> Result<(), PostingError> {
    let mut sums: HashMap<Uuid, BalancePair> = HashMap::new();
    for entry in entries {
        sums.entry(entry.account_id)
            .or_default()
            .accumulate(entry.debit, entry.credit);
    }

    let account_ids: Vec<Uuid> = sums.keys().copied().collect();
    let account_rows = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(account_ids))
        .all(txn)
        .await?;
    let natures: HashMap<Uuid, kassa_core::account::AccountNature> = account_rows
        .into_iter()
        .map(|a| (a.id, a.nature.into()))
        .collect();

    let month = i32::try_from(key.month).unwrap_or_default();
    for (account_id, movement) in sums {
        let nature = *natures
            .get(&account_id)
            .ok_or(PostingError::AccountNotFound(account_id))?;

        let existing = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::AccountId.eq(account_id))
            .filter(ledger_balances::Column::FiscalYear.eq(key.year))
            .filter(ledger_balances::Column::FiscalMonth.eq(month))
            .one(txn)
            .await?;

        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        match existing {
            Some(model) => {
                let mut balance = model.to_core();
                balance.apply_entry(nature, movement.debit, movement.credit);

                let mut active: ledger_balances::ActiveModel = model.into();
                active.period_debit = Set(balance.period.debit);
                active.period_credit = Set(balance.period.credit);
                active.closing_debit = Set(balance.closing.debit);
                active.closing_credit = Set(balance.closing.credit);
                active.updated_at = Set(now);
                active.update(txn).await?;
            }
            None => {
                let opening =
                    carry_opening(latest_prior_closing(txn, account_id, key).await?);
                let mut balance = LedgerBalance::open(account_id, key.year, key.month, opening);
                balance.apply_entry(nature, movement.debit, movement.credit);

                let row = ledger_balances::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    company_id: Set(company_id),
                    account_id: Set(account_id),
                    fiscal_year: Set(key.year),
                    fiscal_month: Set(month),
                    opening_debit: Set(balance.opening.debit),
                    opening_credit: Set(balance.opening.credit),
                    period_debit: Set(balance.period.debit),
                    period_credit: Set(balance.period.credit),
                    closing_debit: Set(balance.closing.debit),
                    closing_credit: Set(balance.closing.credit),
                    updated_at: Set(now),
                };
                row.insert(txn).await?;
            }
        }
    }

    Ok(())
}

/// Closing pair of the latest balance row strictly before `key`.
pub(crate) async fn latest_prior_closing(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    key: PeriodKey,
) -> Result<Option<BalancePair>, DbErr> {
    let month = i32::try_from(key.month).unwrap_or_default();
    let prior = ledger_balances::Entity::find()
        .filter(ledger_balances::Column::AccountId.eq(account_id))
        .filter(
            Condition::any()
                .add(ledger_balances::Column::FiscalYear.lt(key.year))
                .add(
                    Condition::all()
                        .add(ledger_balances::Column::FiscalYear.eq(key.year))
                        .add(ledger_balances::Column::FiscalMonth.lt(month)),
                ),
        )
        .order_by_desc(ledger_balances::Column::FiscalYear)
        .order_by_desc(ledger_balances::Column::FiscalMonth)
        .one(txn)
        .await?;

    Ok(prior.map(|p| BalancePair::new(p.closing_debit, p.closing_credit)))
}

/// Finds any closed period of the company strictly after `key`.
async fn find_later_closed_period(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    key: PeriodKey,
) -> Result<Option<fiscal_periods::Model>, DbErr> {
    let month = i32::try_from(key.month).unwrap_or_default();
    fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::CompanyId.eq(company_id))
        .filter(fiscal_periods::Column::Status.eq(sea_orm_active_enums::FiscalPeriodStatus::Closed))
        .filter(
            Condition::any()
                .add(fiscal_periods::Column::FiscalYear.gt(key.year))
                .add(
                    Condition::all()
                        .add(fiscal_periods::Column::FiscalYear.eq(key.year))
                        .add(fiscal_periods::Column::FiscalMonth.gt(month)),
                ),
        )
        .order_by_asc(fiscal_periods::Column::FiscalYear)
        .order_by_asc(fiscal_periods::Column::FiscalMonth)
        .one(txn)
        .await
}

/// Draws the next number for (company, type, period) from the durable
/// sequence row, creating it on first use. Runs under the period lock.
async fn next_voucher_no(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    voucher_type: sea_orm_active_enums::VoucherType,
    key: PeriodKey,
) -> Result<i64, PostingError> {
    let month = i32::try_from(key.month).unwrap_or_default();
    let sequence = voucher_sequences::Entity::find()
        .filter(voucher_sequences::Column::CompanyId.eq(company_id))
        .filter(voucher_sequences::Column::VoucherType.eq(voucher_type))
        .filter(voucher_sequences::Column::FiscalYear.eq(key.year))
        .filter(voucher_sequences::Column::FiscalMonth.eq(month))
        .lock_exclusive()
        .one(txn)
        .await?;

    match sequence {
        Some(sequence) => {
            let number = sequence.next_no;
            let mut active: voucher_sequences::ActiveModel = sequence.into();
            active.next_no = Set(number + 1);
            active.update(txn).await?;
            Ok(number)
        }
        None => {
            let row = voucher_sequences::ActiveModel {
                id: Set(Uuid::new_v4()),
                company_id: Set(company_id),
                voucher_type: Set(voucher_type),
                fiscal_year: Set(key.year),
                fiscal_month: Set(month),
                next_no: Set(2),
            };
            row.insert(txn).await?;
            Ok(1)
        }
    }
}

/// Finds the fiscal period containing the given date.
pub(crate) async fn find_period_for_date(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    date: NaiveDate,
) -> Result<Option<fiscal_periods::Model>, DbErr> {
    fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::CompanyId.eq(company_id))
        .filter(fiscal_periods::Column::StartDate.lte(date))
        .filter(fiscal_periods::Column::EndDate.gte(date))
        .one(txn)
        .await
}
