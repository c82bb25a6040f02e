//! Voucher repository for lifecycle database operations.
//!
//! Every state transition is an optimistic compare-and-set: the UPDATE is
//! filtered on the status the caller saw, and zero affected rows means a
//! concurrent writer won; the caller gets a retryable conflict instead of a
//! silently clobbered decision.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use kassa_core::voucher::{
    AccountInfo, CreateVoucherInput, LifecycleService, VoucherEntryInput, VoucherError,
    VoucherStatus, VoucherType, validate_entries,
};
use kassa_shared::ErrorKind;
use kassa_shared::types::{PageRequest, PageResponse};

use crate::entities::{accounts, fiscal_periods, sea_orm_active_enums, voucher_entries, vouchers};

/// Error types for voucher operations.
#[derive(Debug, thiserror::Error)]
pub enum VoucherRepoError {
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(Uuid),

    /// No fiscal period covers the voucher date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// The voucher is no longer editable.
    #[error("Voucher {voucher_id} is {status} and cannot be modified")]
    NotEditable {
        /// The voucher.
        voucher_id: Uuid,
        /// Its current status.
        status: VoucherStatus,
    },

    /// The voucher cannot be deleted in its current status.
    #[error("Voucher {voucher_id} is {status} and cannot be deleted")]
    CannotDelete {
        /// The voucher.
        voucher_id: Uuid,
        /// Its current status.
        status: VoucherStatus,
    },

    /// A concurrent transition won the optimistic check; retry with fresh
    /// state.
    #[error("Voucher {voucher_id} was modified concurrently (expected {expected})")]
    TransitionConflict {
        /// The voucher.
        voucher_id: Uuid,
        /// The status the losing transition expected.
        expected: VoucherStatus,
    },

    /// A lifecycle or validation rule failed.
    #[error(transparent)]
    Lifecycle(#[from] VoucherError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl VoucherRepoError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VoucherNotFound(_) | Self::NoFiscalPeriod(_) => ErrorKind::NotFound,
            Self::NotEditable { .. } | Self::CannotDelete { .. } => ErrorKind::StateConflict,
            Self::TransitionConflict { .. } => ErrorKind::ConcurrencyConflict,
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

/// Input for updating a draft or pending voucher. `None` leaves unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateVoucherInput {
    /// New voucher date.
    pub voucher_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
    /// New external reference (`Some(None)` clears it).
    pub reference: Option<Option<String>>,
    /// Replacement entry lines.
    pub entries: Option<Vec<VoucherEntryInput>>,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Filter by status.
    pub status: Option<VoucherStatus>,
    /// Filter by voucher type.
    pub voucher_type: Option<VoucherType>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// A voucher with its entry lines and derived reversal lookup.
#[derive(Debug, Clone)]
pub struct VoucherWithEntries {
    /// Voucher header.
    pub voucher: vouchers::Model,
    /// Entry lines, ordered by line number.
    pub entries: Vec<voucher_entries::Model>,
    /// The reversal voucher pointing at this one, if any (derived from the
    /// reversal's `reversal_of` column, never stored on the original).
    pub reversed_by: Option<Uuid>,
}

/// Voucher repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a voucher in Draft status with its entries.
    ///
    /// Full entry validation runs at submit; creation only requires a
    /// covering fiscal period for the date.
    ///
    /// # Errors
    ///
    /// Returns an error if no fiscal period covers the voucher date.
    pub async fn create_voucher(
        &self,
        input: CreateVoucherInput,
    ) -> Result<VoucherWithEntries, VoucherRepoError> {
        let period = self
            .find_period_for_date(input.company_id, input.voucher_date)
            .await?;

        let total_debit: Decimal = input.entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = input.entries.iter().map(|e| e.credit).sum();

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let voucher_id = Uuid::new_v4();

        let voucher = vouchers::ActiveModel {
            id: Set(voucher_id),
            company_id: Set(input.company_id),
            fiscal_period_id: Set(period.id),
            voucher_no: Set(None),
            voucher_type: Set(input.voucher_type.into()),
            voucher_date: Set(input.voucher_date),
            description: Set(input.description),
            reference: Set(input.reference),
            status: Set(sea_orm_active_enums::VoucherStatus::Draft),
            total_debit: Set(total_debit),
            total_credit: Set(total_credit),
            reversal_of: Set(None),
            created_by: Set(input.created_by),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            posted_by: Set(None),
            posted_at: Set(None),
            rejection_reason: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let voucher = voucher.insert(&txn).await?;

        let entries = insert_entries(&txn, voucher_id, &input.entries).await?;
        txn.commit().await?;

        Ok(VoucherWithEntries {
            voucher,
            entries,
            reversed_by: None,
        })
    }

    /// Updates a voucher that is still in an editable status.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing, not editable, or a date
    /// change lands outside any fiscal period.
    pub async fn update_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        input: UpdateVoucherInput,
    ) -> Result<VoucherWithEntries, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();
        if !status.is_editable() {
            return Err(VoucherRepoError::NotEditable { voucher_id, status });
        }

        let new_period = match input.voucher_date {
            Some(date) if date != voucher.voucher_date => {
                Some(self.find_period_for_date(company_id, date).await?)
            }
            _ => None,
        };

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let mut active: vouchers::ActiveModel = voucher.into();

        if let Some(date) = input.voucher_date {
            active.voucher_date = Set(date);
        }
        if let Some(period) = new_period {
            active.fiscal_period_id = Set(period.id);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(reference) = input.reference {
            active.reference = Set(reference);
        }

        let entries = if let Some(new_entries) = &input.entries {
            voucher_entries::Entity::delete_many()
                .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
                .exec(&txn)
                .await?;
            let total_debit: Decimal = new_entries.iter().map(|e| e.debit).sum();
            let total_credit: Decimal = new_entries.iter().map(|e| e.credit).sum();
            active.total_debit = Set(total_debit);
            active.total_credit = Set(total_credit);
            insert_entries(&txn, voucher_id, new_entries).await?
        } else {
            self.load_entries(voucher_id).await?
        };

        active.updated_at = Set(now);
        let voucher = active.update(&txn).await?;
        txn.commit().await?;

        let reversed_by = self.find_reversed_by(voucher_id).await?;
        Ok(VoucherWithEntries {
            voucher,
            entries,
            reversed_by,
        })
    }

    /// Gets a voucher with entries and the derived reversal linkage.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist for the company.
    pub async fn get_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
    ) -> Result<VoucherWithEntries, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let entries = self.load_entries(voucher_id).await?;
        let reversed_by = self.find_reversed_by(voucher_id).await?;
        Ok(VoucherWithEntries {
            voucher,
            entries,
            reversed_by,
        })
    }

    /// Lists vouchers with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vouchers(
        &self,
        company_id: Uuid,
        filter: VoucherFilter,
        page: PageRequest,
    ) -> Result<PageResponse<vouchers::Model>, VoucherRepoError> {
        let mut query = vouchers::Entity::find()
            .filter(vouchers::Column::CompanyId.eq(company_id));

        if let Some(status) = filter.status {
            let db_status: sea_orm_active_enums::VoucherStatus = status.into();
            query = query.filter(vouchers::Column::Status.eq(db_status));
        }
        if let Some(voucher_type) = filter.voucher_type {
            let db_type: sea_orm_active_enums::VoucherType = voucher_type.into();
            query = query.filter(vouchers::Column::VoucherType.eq(db_type));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(vouchers::Column::VoucherDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(vouchers::Column::VoucherDate.lte(date_to));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(vouchers::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Deletes a voucher in a removable status (draft, rejected, cancelled).
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing or not removable.
    pub async fn delete_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
    ) -> Result<(), VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();
        if !status.is_removable() {
            return Err(VoucherRepoError::CannotDelete { voucher_id, status });
        }

        vouchers::Entity::delete_by_id(voucher_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Submits a draft voucher for approval.
    ///
    /// Runs the full entry validation (shape, account eligibility, balance)
    /// and flips draft → pending with an optimistic check. Validation
    /// failures leave the voucher untouched.
    ///
    /// # Errors
    ///
    /// Returns validation errors, or a retryable conflict if a concurrent
    /// transition won.
    pub async fn submit_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        submitted_by: Uuid,
    ) -> Result<vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();
        let entries = self.load_entries(voucher_id).await?;

        let inputs: Vec<VoucherEntryInput> = entries.iter().map(to_entry_input).collect();
        let account_infos = self.load_account_infos(company_id, &inputs).await?;
        let totals = validate_entries(&inputs, |id| {
            account_infos
                .get(&id)
                .cloned()
                .ok_or(VoucherError::AccountNotFound(id))
        })?;

        let action = LifecycleService::submit(status, submitted_by)?;

        let db_new: sea_orm_active_enums::VoucherStatus = action.new_status().into();
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let db_expected: sea_orm_active_enums::VoucherStatus = status.into();
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::Status, Expr::value(db_new))
            .col_expr(vouchers::Column::SubmittedBy, Expr::value(submitted_by))
            .col_expr(vouchers::Column::SubmittedAt, Expr::value(now))
            .col_expr(vouchers::Column::TotalDebit, Expr::value(totals.total_debit))
            .col_expr(
                vouchers::Column::TotalCredit,
                Expr::value(totals.total_credit),
            )
            .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
            .filter(vouchers::Column::Id.eq(voucher_id))
            .filter(vouchers::Column::Status.eq(db_expected))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(VoucherRepoError::TransitionConflict {
                voucher_id,
                expected: status,
            });
        }

        self.find_voucher(company_id, voucher_id).await
    }

    /// Approves a pending voucher.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid transition, or a retryable conflict
    /// when a concurrent decision won.
    pub async fn approve_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        approved_by: Uuid,
    ) -> Result<vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();

        let action = LifecycleService::approve(status, approved_by)?;

        let db_new: sea_orm_active_enums::VoucherStatus = action.new_status().into();
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let db_expected: sea_orm_active_enums::VoucherStatus = status.into();
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::Status, Expr::value(db_new))
            .col_expr(vouchers::Column::ApprovedBy, Expr::value(approved_by))
            .col_expr(vouchers::Column::ApprovedAt, Expr::value(now))
            .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
            .filter(vouchers::Column::Id.eq(voucher_id))
            .filter(vouchers::Column::Status.eq(db_expected))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(VoucherRepoError::TransitionConflict {
                voucher_id,
                expected: status,
            });
        }

        self.find_voucher(company_id, voucher_id).await
    }

    /// Rejects a pending voucher with a reason.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid transition or empty reason, or a
    /// retryable conflict when a concurrent decision won.
    pub async fn reject_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();

        let action = LifecycleService::reject(status, rejected_by, reason.clone())?;

        let db_new: sea_orm_active_enums::VoucherStatus = action.new_status().into();
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let db_expected: sea_orm_active_enums::VoucherStatus = status.into();
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::Status, Expr::value(db_new))
            .col_expr(vouchers::Column::RejectionReason, Expr::value(reason))
            .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
            .filter(vouchers::Column::Id.eq(voucher_id))
            .filter(vouchers::Column::Status.eq(db_expected))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(VoucherRepoError::TransitionConflict {
                voucher_id,
                expected: status,
            });
        }

        self.find_voucher(company_id, voucher_id).await
    }

    /// Cancels a voucher from draft, pending or rejected.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid transition, or a retryable conflict
    /// when a concurrent transition won.
    pub async fn cancel_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
        cancelled_by: Uuid,
    ) -> Result<vouchers::Model, VoucherRepoError> {
        let voucher = self.find_voucher(company_id, voucher_id).await?;
        let status: VoucherStatus = voucher.status.into();

        let action = LifecycleService::cancel(status, cancelled_by)?;

        let db_new: sea_orm_active_enums::VoucherStatus = action.new_status().into();
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now());
        let db_expected: sea_orm_active_enums::VoucherStatus = status.into();
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::Status, Expr::value(db_new))
            .col_expr(vouchers::Column::CancelledBy, Expr::value(cancelled_by))
            .col_expr(vouchers::Column::CancelledAt, Expr::value(now))
            .col_expr(vouchers::Column::UpdatedAt, Expr::value(now))
            .filter(vouchers::Column::Id.eq(voucher_id))
            .filter(vouchers::Column::Status.eq(db_expected))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(VoucherRepoError::TransitionConflict {
                voucher_id,
                expected: status,
            });
        }

        self.find_voucher(company_id, voucher_id).await
    }

    /// Finds the voucher header, scoped by company.
    async fn find_voucher(
        &self,
        company_id: Uuid,
        voucher_id: Uuid,
    ) -> Result<vouchers::Model, VoucherRepoError> {
        vouchers::Entity::find_by_id(voucher_id)
            .filter(vouchers::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(VoucherRepoError::VoucherNotFound(voucher_id))
    }

    /// Loads entries ordered by line number.
    async fn load_entries(
        &self,
        voucher_id: Uuid,
    ) -> Result<Vec<voucher_entries::Model>, VoucherRepoError> {
        let entries = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Finds the reversal voucher pointing at the given voucher, if any.
    async fn find_reversed_by(&self, voucher_id: Uuid) -> Result<Option<Uuid>, VoucherRepoError> {
        let reversal = vouchers::Entity::find()
            .filter(vouchers::Column::ReversalOf.eq(voucher_id))
            .one(&self.db)
            .await?;
        Ok(reversal.map(|r| r.id))
    }

    /// Loads eligibility info for every account the entries reference.
    async fn load_account_infos(
        &self,
        company_id: Uuid,
        entries: &[VoucherEntryInput],
    ) -> Result<HashMap<Uuid, AccountInfo>, VoucherRepoError> {
        let ids: Vec<Uuid> = entries.iter().map(|e| e.account_id).collect();
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .filter(accounts::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    AccountInfo {
                        id: m.id,
                        is_active: m.is_active,
                        is_control: m.is_control,
                        allow_direct_posting: m.allow_direct_posting,
                    },
                )
            })
            .collect())
    }

    /// Finds the fiscal period containing the given date.
    async fn find_period_for_date(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<fiscal_periods::Model, VoucherRepoError> {
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?
            .ok_or(VoucherRepoError::NoFiscalPeriod(date))
    }
}

/// Inserts entry rows with sequential line numbers.
pub(crate) async fn insert_entries<C: sea_orm::ConnectionTrait>(
    conn: &C,
    voucher_id: Uuid,
    entries: &[VoucherEntryInput],
) -> Result<Vec<voucher_entries::Model>, DbErr> {
    let now = chrono::Utc::now().into();
    let mut result = Vec::with_capacity(entries.len());

    for (idx, input) in entries.iter().enumerate() {
        let line_no = i32::try_from(idx).unwrap_or(i32::MAX) + 1;
        let entry = voucher_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            voucher_id: Set(voucher_id),
            line_no: Set(line_no),
            account_id: Set(input.account_id),
            debit: Set(input.debit),
            credit: Set(input.credit),
            description: Set(input.description.clone()),
            partner: Set(input.tags.partner.clone()),
            department: Set(input.tags.department.clone()),
            project: Set(input.tags.project.clone()),
            cost_center: Set(input.tags.cost_center.clone()),
            created_at: Set(now),
        };
        result.push(entry.insert(conn).await?);
    }

    Ok(result)
}

/// Converts an entry row back into the core input representation.
#[must_use]
pub fn to_entry_input(entry: &voucher_entries::Model) -> VoucherEntryInput {
    VoucherEntryInput {
        account_id: entry.account_id,
        debit: entry.debit,
        credit: entry.credit,
        description: entry.description.clone(),
        tags: kassa_core::voucher::EntryTags {
            partner: entry.partner.clone(),
            department: entry.department.clone(),
            project: entry.project.clone(),
            cost_center: entry.cost_center.clone(),
        },
    }
}
