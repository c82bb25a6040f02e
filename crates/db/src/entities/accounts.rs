//! `SeaORM` Entity for the accounts table (chart of accounts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountNature, AccountType};

/// One chart of accounts entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Parent account, if any.
    pub parent_id: Option<Uuid>,
    /// Depth in the tree; roots are level 1.
    pub level: i16,
    /// Materialized path of ancestor codes joined with `/`.
    pub path: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Balance side.
    pub nature: AccountNature,
    /// Aggregation-only account; rejects direct postings.
    pub is_control: bool,
    /// Whether entries may post directly to this account.
    pub allow_direct_posting: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Ordering among siblings.
    pub sort_order: i32,
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
    /// Parent account.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    /// Voucher entries posting to this account.
    #[sea_orm(has_many = "super::voucher_entries::Entity")]
    VoucherEntries,
    /// Balance rows for this account.
    #[sea_orm(has_many = "super::ledger_balances::Entity")]
    LedgerBalances,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::voucher_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherEntries.def()
    }
}

impl Related<super::ledger_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
