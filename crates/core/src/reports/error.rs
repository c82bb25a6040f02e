//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use kassa_shared::ErrorKind;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// No fiscal period covers the requested year/month.
    #[error("Fiscal period {year}-{month:02} not found")]
    PeriodNotFound {
        /// Requested fiscal year.
        year: i32,
        /// Requested fiscal month.
        month: u32,
    },

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}

impl ReportError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::PeriodNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidDateRange { .. } => ErrorKind::Validation,
        }
    }
}
