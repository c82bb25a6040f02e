//! Database enum types mirroring the Postgres enums, with conversions to
//! and from the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity account.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue account.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<kassa_core::account::AccountType> for AccountType {
    fn from(value: kassa_core::account::AccountType) -> Self {
        use kassa_core::account::AccountType as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for kassa_core::account::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

/// The side that increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_nature")]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Debit-normal account.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit-normal account.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<kassa_core::account::AccountNature> for AccountNature {
    fn from(value: kassa_core::account::AccountNature) -> Self {
        use kassa_core::account::AccountNature as Core;
        match value {
            Core::Debit => Self::Debit,
            Core::Credit => Self::Credit,
        }
    }
}

impl From<AccountNature> for kassa_core::account::AccountNature {
    fn from(value: AccountNature) -> Self {
        match value {
            AccountNature::Debit => Self::Debit,
            AccountNature::Credit => Self::Credit,
        }
    }
}

/// Voucher lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Voucher has been submitted for approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Voucher has been approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Voucher has been rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Voucher has been posted to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Voucher has been cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<kassa_core::voucher::VoucherStatus> for VoucherStatus {
    fn from(value: kassa_core::voucher::VoucherStatus) -> Self {
        use kassa_core::voucher::VoucherStatus as Core;
        match value {
            Core::Draft => Self::Draft,
            Core::Pending => Self::Pending,
            Core::Approved => Self::Approved,
            Core::Rejected => Self::Rejected,
            Core::Posted => Self::Posted,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<VoucherStatus> for kassa_core::voucher::VoucherStatus {
    fn from(value: VoucherStatus) -> Self {
        match value {
            VoucherStatus::Draft => Self::Draft,
            VoucherStatus::Pending => Self::Pending,
            VoucherStatus::Approved => Self::Approved,
            VoucherStatus::Rejected => Self::Rejected,
            VoucherStatus::Posted => Self::Posted,
            VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Voucher type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_type")]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// General journal voucher.
    #[sea_orm(string_value = "general")]
    General,
    /// Sales voucher.
    #[sea_orm(string_value = "sales")]
    Sales,
    /// Purchase voucher.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Outgoing payment voucher.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Incoming receipt voucher.
    #[sea_orm(string_value = "receipt")]
    Receipt,
    /// Adjustment voucher.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Year-end closing voucher.
    #[sea_orm(string_value = "closing")]
    Closing,
}

impl From<kassa_core::voucher::VoucherType> for VoucherType {
    fn from(value: kassa_core::voucher::VoucherType) -> Self {
        use kassa_core::voucher::VoucherType as Core;
        match value {
            Core::General => Self::General,
            Core::Sales => Self::Sales,
            Core::Purchase => Self::Purchase,
            Core::Payment => Self::Payment,
            Core::Receipt => Self::Receipt,
            Core::Adjustment => Self::Adjustment,
            Core::Closing => Self::Closing,
        }
    }
}

impl From<VoucherType> for kassa_core::voucher::VoucherType {
    fn from(value: VoucherType) -> Self {
        match value {
            VoucherType::General => Self::General,
            VoucherType::Sales => Self::Sales,
            VoucherType::Purchase => Self::Purchase,
            VoucherType::Payment => Self::Payment,
            VoucherType::Receipt => Self::Receipt,
            VoucherType::Adjustment => Self::Adjustment,
            VoucherType::Closing => Self::Closing,
        }
    }
}

/// Fiscal period status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fiscal_period_status")]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Period is open for posting.
    #[sea_orm(string_value = "open")]
    Open,
    /// Period is closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<kassa_core::fiscal::PeriodStatus> for FiscalPeriodStatus {
    fn from(value: kassa_core::fiscal::PeriodStatus) -> Self {
        use kassa_core::fiscal::PeriodStatus as Core;
        match value {
            Core::Open => Self::Open,
            Core::Closed => Self::Closed,
        }
    }
}

impl From<FiscalPeriodStatus> for kassa_core::fiscal::PeriodStatus {
    fn from(value: FiscalPeriodStatus) -> Self {
        match value {
            FiscalPeriodStatus::Open => Self::Open,
            FiscalPeriodStatus::Closed => Self::Closed,
        }
    }
}
