//! `SeaORM` Entity for the voucher_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One line within a voucher. Owned exclusively by its voucher; exactly one
/// of debit/credit is strictly positive.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "voucher_entries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning voucher.
    pub voucher_id: Uuid,
    /// Line number within the voucher, starting at 1.
    pub line_no: i32,
    /// The account posted to.
    pub account_id: Uuid,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Business partner tag.
    pub partner: Option<String>,
    /// Department tag.
    pub department: Option<String>,
    /// Project tag.
    pub project: Option<String>,
    /// Cost center tag.
    pub cost_center: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning voucher.
    #[sea_orm(
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::vouchers::Column::Id"
    )]
    Vouchers,
    /// The account posted to.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
