//! Per-period ledger balance arithmetic.
//!
//! Balances are kept as debit/credit column pairs per (account, fiscal
//! period). The roll-forward rules here are the single source of truth for
//! how period movements become closing balances and how closings carry into
//! the next period's opening.

pub mod balance;

#[cfg(test)]
mod balance_props;

pub use balance::{BalancePair, LedgerBalance, carry_opening, roll_forward, signed_movement};
