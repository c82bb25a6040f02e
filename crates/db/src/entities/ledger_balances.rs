//! `SeaORM` Entity for the ledger_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-account, per-period opening/period/closing balance columns.
///
/// Maintained incrementally by the posting processor; never user-editable.
/// Invariant: `closing(N) == opening(N+1)` for continuous coverage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_balances")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// The account.
    pub account_id: Uuid,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal month, 1-12.
    pub fiscal_month: i32,
    /// Opening debit column.
    pub opening_debit: Decimal,
    /// Opening credit column.
    pub opening_credit: Decimal,
    /// Period debit movement.
    pub period_debit: Decimal,
    /// Period credit movement.
    pub period_credit: Decimal,
    /// Closing debit column.
    pub closing_debit: Decimal,
    /// Closing credit column.
    pub closing_credit: Decimal,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the core balance representation.
    #[must_use]
    pub fn to_core(&self) -> kassa_core::ledger::LedgerBalance {
        use kassa_core::ledger::{BalancePair, LedgerBalance};
        LedgerBalance {
            account_id: self.account_id,
            fiscal_year: self.fiscal_year,
            fiscal_month: self.fiscal_month.unsigned_abs(),
            opening: BalancePair::new(self.opening_debit, self.opening_credit),
            period: BalancePair::new(self.period_debit, self.period_credit),
            closing: BalancePair::new(self.closing_debit, self.closing_credit),
        }
    }
}
