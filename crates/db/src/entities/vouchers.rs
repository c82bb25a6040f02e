//! `SeaORM` Entity for the vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{VoucherStatus, VoucherType};

/// A voucher (journal entry) header.
///
/// `voucher_no` stays NULL until the posting processor assigns it from the
/// durable per-(company, type, period) sequence. `reversal_of` is only ever
/// written on the reversal voucher at creation; the original's `reversed_by`
/// is derived by lookup.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Fiscal period containing the voucher date.
    pub fiscal_period_id: Uuid,
    /// Sequential number within (company, type, period); assigned at posting.
    pub voucher_no: Option<i64>,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher date.
    pub voucher_date: Date,
    /// Description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Lifecycle status.
    pub status: VoucherStatus,
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
    /// The voucher this one reverses, if it is a reversal.
    pub reversal_of: Option<Uuid>,
    /// User who created the voucher.
    pub created_by: Uuid,
    /// User who submitted the voucher.
    pub submitted_by: Option<Uuid>,
    /// When the voucher was submitted.
    pub submitted_at: Option<DateTimeWithTimeZone>,
    /// User who approved the voucher.
    pub approved_by: Option<Uuid>,
    /// When the voucher was approved.
    pub approved_at: Option<DateTimeWithTimeZone>,
    /// User who posted the voucher.
    pub posted_by: Option<Uuid>,
    /// When the voucher was posted.
    pub posted_at: Option<DateTimeWithTimeZone>,
    /// Why the voucher was rejected.
    pub rejection_reason: Option<String>,
    /// User who cancelled the voucher.
    pub cancelled_by: Option<Uuid>,
    /// When the voucher was cancelled.
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning company.
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    /// Fiscal period containing the voucher date.
    #[sea_orm(
        belongs_to = "super::fiscal_periods::Entity",
        from = "Column::FiscalPeriodId",
        to = "super::fiscal_periods::Column::Id"
    )]
    FiscalPeriods,
    /// The reversed original, if this voucher is a reversal.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ReversalOf",
        to = "Column::Id"
    )]
    Original,
    /// Entry lines.
    #[sea_orm(has_many = "super::voucher_entries::Entity")]
    VoucherEntries,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl Related<super::voucher_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
