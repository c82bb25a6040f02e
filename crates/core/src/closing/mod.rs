//! Year-end closing logic.

pub mod service;

pub use service::{ClosingBalance, ClosingError, build_closing_entries, validate_retained_earnings};
