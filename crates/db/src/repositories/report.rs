//! Report repository: loads account and balance rows and feeds the pure
//! report service. Read-only; takes no locks and tolerates a slightly
//! stale but internally consistent snapshot.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use kassa_core::fiscal::PeriodKey;
use kassa_core::ledger::{BalancePair, LedgerBalance, signed_movement};
use kassa_core::reports::{
    AccountLedgerRow, BalanceSheetReport, IncomeStatementReport, ReportAccount, ReportError,
    ReportService, TrialBalanceReport,
};
use kassa_shared::ErrorKind;
use kassa_shared::types::{PageRequest, PageResponse};

use crate::entities::{accounts, ledger_balances, sea_orm_active_enums, voucher_entries, vouchers};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// A report input rule failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ReportRepoError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Report(e) => e.kind(),
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates the trial balance for one fiscal period.
    ///
    /// Accounts whose last activity predates the period still appear, with
    /// their latest closing carried as an activity-free opening.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_trial_balance(
        &self,
        company_id: Uuid,
        fiscal_year: i32,
        fiscal_month: u32,
    ) -> Result<TrialBalanceReport, ReportRepoError> {
        let key = PeriodKey {
            year: fiscal_year,
            month: fiscal_month,
        };
        let accounts = self.load_report_accounts(company_id).await?;
        let balances = self.balances_as_of(company_id, key).await?;

        Ok(ReportService::generate_trial_balance(
            &accounts,
            &balances,
            fiscal_year,
            fiscal_month,
        ))
    }

    /// Generates a balance sheet as of a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_balance_sheet(
        &self,
        company_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, ReportRepoError> {
        let key = PeriodKey::from_date(as_of);
        let accounts = self.load_report_accounts(company_id).await?;
        let balances = self.balances_as_of(company_id, key).await?;

        Ok(ReportService::generate_balance_sheet(
            &accounts, &balances, as_of,
        ))
    }

    /// Generates an income statement over a date range.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidDateRange`] when `from > to`.
    pub async fn get_income_statement(
        &self,
        company_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<IncomeStatementReport, ReportRepoError> {
        if from > to {
            return Err(ReportError::InvalidDateRange { start: from, end: to }.into());
        }

        let from_key = PeriodKey::from_date(from);
        let to_key = PeriodKey::from_date(to);
        let accounts = self.load_report_accounts(company_id).await?;

        let rows = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;

        let mut movements: HashMap<Uuid, BalancePair> = HashMap::new();
        for row in rows {
            let row_key = PeriodKey {
                year: row.fiscal_year,
                month: row.fiscal_month.unsigned_abs(),
            };
            if row_key >= from_key && row_key <= to_key {
                movements
                    .entry(row.account_id)
                    .or_default()
                    .accumulate(row.period_debit, row.period_credit);
            }
        }

        Ok(ReportService::generate_income_statement(
            &accounts, &movements, from, to,
        ))
    }

    /// Lists an account's posted entries with voucher context and a running
    /// balance, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist for the company.
    pub async fn get_account_ledger(
        &self,
        company_id: Uuid,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: PageRequest,
    ) -> Result<PageResponse<AccountLedgerRow>, ReportRepoError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(ReportError::AccountNotFound(account_id))?;
        let nature: kassa_core::account::AccountNature = account.nature.into();

        // Balance walked up to the start of the range.
        let mut running = match from {
            Some(from_date) => self.balance_before(company_id, account_id, from_date).await?,
            None => Decimal::ZERO,
        };

        let mut query = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::AccountId.eq(account_id))
            .join(JoinType::InnerJoin, voucher_entries::Relation::Vouchers.def())
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .filter(vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Posted));
        if let Some(from_date) = from {
            query = query.filter(vouchers::Column::VoucherDate.gte(from_date));
        }
        if let Some(to_date) = to {
            query = query.filter(vouchers::Column::VoucherDate.lte(to_date));
        }

        let total = query.clone().count(&self.db).await?;

        // The running balance needs every row before the requested page, so
        // rows are fetched from the range start up to the page end and the
        // leading rows are dropped after accumulation.
        let upto = page.offset() + page.limit();
        let rows: Vec<LedgerQueryRow> = query
            .select_only()
            .column(voucher_entries::Column::Debit)
            .column(voucher_entries::Column::Credit)
            .column(voucher_entries::Column::Description)
            .column_as(vouchers::Column::Id, "voucher_id")
            .column_as(vouchers::Column::VoucherNo, "voucher_no")
            .column_as(vouchers::Column::VoucherDate, "voucher_date")
            .column_as(vouchers::Column::Description, "voucher_description")
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::VoucherNo)
            .order_by_asc(voucher_entries::Column::LineNo)
            .limit(upto)
            .into_model::<LedgerQueryRow>()
            .all(&self.db)
            .await?;

        let mut ledger_rows = Vec::with_capacity(rows.len());
        for row in rows {
            running += signed_movement(nature, row.debit, row.credit);
            ledger_rows.push(AccountLedgerRow {
                voucher_id: row.voucher_id,
                voucher_no: row.voucher_no.unwrap_or_default(),
                voucher_date: row.voucher_date,
                description: row.description.unwrap_or(row.voucher_description),
                debit: row.debit,
                credit: row.credit,
                running_balance: running,
            });
        }

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data = if offset < ledger_rows.len() {
            ledger_rows.split_off(offset)
        } else {
            Vec::new()
        };

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Loads the company's accounts in the report input shape.
    async fn load_report_accounts(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<ReportAccount>, ReportRepoError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| ReportAccount {
                id: m.id,
                parent_id: m.parent_id,
                code: m.code,
                name: m.name,
                level: m.level,
                account_type: m.account_type.into(),
                nature: m.nature.into(),
                is_control: m.is_control,
                sort_order: m.sort_order,
            })
            .collect())
    }

    /// Latest balance row per account at or before `key`. Accounts whose
    /// latest row predates the period get a synthetic activity-free row
    /// carrying their closing forward.
    async fn balances_as_of(
        &self,
        company_id: Uuid,
        key: PeriodKey,
    ) -> Result<HashMap<Uuid, LedgerBalance>, ReportRepoError> {
        let rows = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::CompanyId.eq(company_id))
            .order_by_asc(ledger_balances::Column::FiscalYear)
            .order_by_asc(ledger_balances::Column::FiscalMonth)
            .all(&self.db)
            .await?;

        let mut latest: HashMap<Uuid, LedgerBalance> = HashMap::new();
        for row in rows {
            let row_key = PeriodKey {
                year: row.fiscal_year,
                month: row.fiscal_month.unsigned_abs(),
            };
            if row_key <= key {
                latest.insert(row.account_id, row.to_core());
            }
        }

        // Carry stale closings forward as openings of the requested period.
        for balance in latest.values_mut() {
            let row_key = PeriodKey {
                year: balance.fiscal_year,
                month: balance.fiscal_month,
            };
            if row_key < key {
                *balance = LedgerBalance::open(
                    balance.account_id,
                    key.year,
                    key.month,
                    balance.closing,
                );
            }
        }

        Ok(latest)
    }

    /// Net posted movement on an account strictly before `cutoff`, signed
    /// toward the account's nature.
    async fn balance_before(
        &self,
        company_id: Uuid,
        account_id: Uuid,
        cutoff: NaiveDate,
    ) -> Result<Decimal, ReportRepoError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(ReportError::AccountNotFound(account_id))?;
        let nature: kassa_core::account::AccountNature = account.nature.into();

        let sums: Option<SumRow> = voucher_entries::Entity::find()
            .select_only()
            .column_as(voucher_entries::Column::Debit.sum(), "debit")
            .column_as(voucher_entries::Column::Credit.sum(), "credit")
            .join(JoinType::InnerJoin, voucher_entries::Relation::Vouchers.def())
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .filter(vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Posted))
            .filter(vouchers::Column::VoucherDate.lt(cutoff))
            .filter(voucher_entries::Column::AccountId.eq(account_id))
            .into_model::<SumRow>()
            .one(&self.db)
            .await?;

        let (debit, credit) = sums
            .map(|s| (s.debit.unwrap_or_default(), s.credit.unwrap_or_default()))
            .unwrap_or_default();
        Ok(signed_movement(nature, debit, credit))
    }
}

/// Aggregate row for the pre-range balance query.
#[derive(Debug, FromQueryResult)]
struct SumRow {
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

/// Joined row for the account ledger listing.
#[derive(Debug, FromQueryResult)]
struct LedgerQueryRow {
    debit: Decimal,
    credit: Decimal,
    description: Option<String>,
    voucher_id: Uuid,
    voucher_no: Option<i64>,
    voucher_date: NaiveDate,
    voucher_description: String,
}
