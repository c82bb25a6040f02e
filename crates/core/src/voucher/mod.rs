//! Voucher lifecycle management.
//!
//! This module implements the voucher state machine, balance validation and
//! reversing-entry construction.
//!
//! # Modules
//!
//! - `types` - Voucher domain types (status, type, entry inputs, totals)
//! - `error` - Voucher-specific error types
//! - `service` - State transition logic
//! - `validation` - Submit-time entry and balance validation
//! - `reversal` - Reversing entry creation

pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod service_props;

pub use error::VoucherError;
pub use reversal::reverse_entries;
pub use service::{LifecycleService, VoucherAction};
pub use types::{
    CreateVoucherInput, EntryTags, VoucherEntryInput, VoucherStatus, VoucherTotals, VoucherType,
};
pub use validation::{AccountInfo, validate_entries};
