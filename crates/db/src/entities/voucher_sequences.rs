//! `SeaORM` Entity for the voucher_sequences table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherType;

/// Durable voucher number counter per (company, type, period).
///
/// Read and bumped under the posting transaction's period lock, so
/// concurrent posting can neither duplicate nor skip numbers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "voucher_sequences")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Voucher type this series numbers.
    pub voucher_type: VoucherType,
    /// Fiscal year of the series.
    pub fiscal_year: i32,
    /// Fiscal month of the series, 1-12.
    pub fiscal_month: i32,
    /// Next number to hand out.
    pub next_no: i64,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
