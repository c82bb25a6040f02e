//! Fiscal period management.

pub mod period;

pub use period::{FiscalPeriod, PeriodKey, PeriodStatus};
