//! `SeaORM` Entity for the companies table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A company (tenant). Every other table is scoped by `company_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Company name.
    pub name: String,
    /// Functional currency code (ISO 4217), display-only.
    pub currency: String,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Accounts belonging to this company.
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    /// Vouchers belonging to this company.
    #[sea_orm(has_many = "super::vouchers::Entity")]
    Vouchers,
    /// Fiscal periods belonging to this company.
    #[sea_orm(has_many = "super::fiscal_periods::Entity")]
    FiscalPeriods,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
