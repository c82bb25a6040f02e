//! `SeaORM` entity definitions.

pub mod accounts;
pub mod companies;
pub mod fiscal_periods;
pub mod ledger_balances;
pub mod sea_orm_active_enums;
pub mod voucher_entries;
pub mod voucher_sequences;
pub mod vouchers;
