//! Fiscal period types and calendar math.
//!
//! Periods are calendar months identified by `(fiscal_year, fiscal_month)`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use kassa_shared::types::{CompanyId, FiscalPeriodId, UserId};

/// Identifies one fiscal period: a calendar month within a year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeriodKey {
    /// Fiscal year.
    pub year: i32,
    /// Fiscal month, 1-12.
    pub month: u32,
}

impl PeriodKey {
    /// Creates a key, rejecting months outside 1-12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period containing the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following period.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding period.
    #[must_use]
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First day of the period.
    ///
    /// # Panics
    ///
    /// Never panics for keys built through [`PeriodKey::new`] or
    /// [`PeriodKey::from_date`].
    #[must_use]
    pub fn start_date(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month is validated")
    }

    /// Last day of the period.
    #[must_use]
    pub fn end_date(self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .expect("month start has a predecessor")
    }

    /// Human-readable name, e.g. "January 2024".
    #[must_use]
    pub fn label(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// All twelve periods of a year, in order.
    #[must_use]
    pub fn months_of_year(year: i32) -> Vec<Self> {
        (1..=12).map(|month| Self { year, month }).collect()
    }
}

/// Returns the month name for 1-12.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open for posting.
    Open,
    /// Period is closed; no new postings accepted.
    Closed,
}

impl PeriodStatus {
    /// Returns true if postings are accepted.
    #[must_use]
    pub fn allows_posting(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A fiscal period row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Company this period belongs to.
    pub company_id: CompanyId,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal month, 1-12.
    pub fiscal_month: u32,
    /// Period name (e.g. "January 2024").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// Who closed the period.
    pub closed_by: Option<UserId>,
    /// When the period was closed.
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl FiscalPeriod {
    /// The period's key.
    #[must_use]
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            year: self.fiscal_year,
            month: self.fiscal_month,
        }
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if postings are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.allows_posting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_key_validation() {
        assert!(PeriodKey::new(2024, 1).is_some());
        assert!(PeriodKey::new(2024, 12).is_some());
        assert!(PeriodKey::new(2024, 0).is_none());
        assert!(PeriodKey::new(2024, 13).is_none());
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(PeriodKey::from_date(date), PeriodKey::new(2024, 1).unwrap());
    }

    #[test]
    fn test_next_prev_wrap_year() {
        let dec = PeriodKey::new(2024, 12).unwrap();
        assert_eq!(dec.next(), PeriodKey::new(2025, 1).unwrap());
        let jan = PeriodKey::new(2024, 1).unwrap();
        assert_eq!(jan.prev(), PeriodKey::new(2023, 12).unwrap());
    }

    #[rstest]
    #[case(2024, 1, 31)]
    #[case(2024, 2, 29)] // leap year
    #[case(2023, 2, 28)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    fn test_end_date(#[case] year: i32, #[case] month: u32, #[case] last_day: u32) {
        let key = PeriodKey::new(year, month).unwrap();
        assert_eq!(
            key.end_date(),
            NaiveDate::from_ymd_opt(year, month, last_day).unwrap()
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(PeriodKey::new(2024, 1).unwrap().label(), "January 2024");
        assert_eq!(PeriodKey::new(2024, 12).unwrap().label(), "December 2024");
    }

    #[test]
    fn test_months_of_year() {
        let months = PeriodKey::months_of_year(2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], PeriodKey::new(2024, 1).unwrap());
        assert_eq!(months[11], PeriodKey::new(2024, 12).unwrap());
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ordering() {
        let a = PeriodKey::new(2023, 12).unwrap();
        let b = PeriodKey::new(2024, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_period_contains_date() {
        let key = PeriodKey::new(2024, 1).unwrap();
        let period = FiscalPeriod {
            id: FiscalPeriodId::new(),
            company_id: CompanyId::new(),
            fiscal_year: key.year,
            fiscal_month: key.month,
            name: key.label(),
            start_date: key.start_date(),
            end_date: key.end_date(),
            status: PeriodStatus::Open,
            closed_by: None,
            closed_at: None,
        };
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(period.is_open());
    }
}
