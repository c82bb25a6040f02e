//! `SeaORM` Entity for the fiscal_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FiscalPeriodStatus;

/// One fiscal period (calendar month) of a company.
///
/// The period row is the serialization point between posting and closing:
/// both lock it `FOR UPDATE` before touching anything dated inside it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal month, 1-12.
    pub fiscal_month: i32,
    /// Period name (e.g. "January 2024").
    pub name: String,
    /// First day of the period.
    pub start_date: Date,
    /// Last day of the period.
    pub end_date: Date,
    /// Current status.
    pub status: FiscalPeriodStatus,
    /// Who closed the period.
    pub closed_by: Option<Uuid>,
    /// When the period was closed.
    pub closed_at: Option<DateTimeWithTimeZone>,
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
    /// Vouchers dated inside this period.
    #[sea_orm(has_many = "super::vouchers::Entity")]
    Vouchers,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The period's key.
    #[must_use]
    pub fn key(&self) -> kassa_core::fiscal::PeriodKey {
        kassa_core::fiscal::PeriodKey {
            year: self.fiscal_year,
            month: self.fiscal_month.unsigned_abs(),
        }
    }
}
