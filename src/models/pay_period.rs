//! Pay period model and month-splitting scheme.
//!
//! This module contains the [`PayPeriod`] type, the [`PeriodHalf`] a period
//! belongs to within its month, and the [`PeriodScheme`] that partitions a
//! month into two pay windows.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which of the two monthly pay windows a period falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodHalf {
    /// The window starting on day 1.
    First,
    /// The window running to the end of the month.
    Second,
}

/// How a month is split into two pay windows.
///
/// The default half-month scheme pays days 1–15 and 16–end. The bi-weekly
/// variant pays days 1–14 and 15–end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodScheme {
    /// Last day of the first window.
    pub first_half_last_day: u32,
    /// Days between a window's end date and its payment date.
    #[serde(default)]
    pub payment_lag_days: u64,
}

impl PeriodScheme {
    /// The 1–15 / 16–end scheme.
    pub fn half_month() -> Self {
        Self {
            first_half_last_day: 15,
            payment_lag_days: 0,
        }
    }

    /// The 1–14 / 15–end scheme.
    pub fn bi_weekly() -> Self {
        Self {
            first_half_last_day: 14,
            payment_lag_days: 0,
        }
    }

    /// Returns the half of the month a date falls in.
    pub fn half_of(&self, date: NaiveDate) -> PeriodHalf {
        if date.day() <= self.first_half_last_day {
            PeriodHalf::First
        } else {
            PeriodHalf::Second
        }
    }

    /// Splits a calendar month into its two pay periods.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PeriodScheme;
    /// use chrono::NaiveDate;
    ///
    /// let [first, second] = PeriodScheme::half_month().split_month(2024, 2).unwrap();
    /// assert_eq!(first.end_date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
    /// assert_eq!(second.start_date, NaiveDate::from_ymd_opt(2024, 2, 16).unwrap());
    /// assert_eq!(second.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// ```
    pub fn split_month(&self, year: i32, month: u32) -> EngineResult<[PayPeriod; 2]> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::invalid_period(format!("{}-{:02} is not a valid month", year, month))
        })?;
        let last_day = last_day_of_month(first_day)?;

        if self.first_half_last_day == 0 || self.first_half_last_day >= last_day.day() {
            return Err(EngineError::invalid_period(format!(
                "first window cannot end on day {} of a {}-day month",
                self.first_half_last_day,
                last_day.day()
            )));
        }

        let first_end = first_day.with_day(self.first_half_last_day).ok_or_else(|| {
            EngineError::invalid_period(format!("day {} out of range", self.first_half_last_day))
        })?;
        let second_start = first_end.succ_opt().ok_or_else(|| {
            EngineError::invalid_period("date overflow computing second window")
        })?;

        Ok([
            PayPeriod::new(first_day, first_end, self.payment_date(first_end)?)?,
            PayPeriod::new(second_start, last_day, self.payment_date(last_day)?)?,
        ])
    }

    fn payment_date(&self, end: NaiveDate) -> EngineResult<NaiveDate> {
        end.checked_add_days(Days::new(self.payment_lag_days))
            .ok_or_else(|| EngineError::invalid_period("payment date out of range"))
    }
}

impl Default for PeriodScheme {
    fn default() -> Self {
        Self::half_month()
    }
}

fn last_day_of_month(first_day: NaiveDate) -> EngineResult<NaiveDate> {
    first_day
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| EngineError::invalid_period("month end out of range"))
}

/// A pay period: the date window an employee is paid for.
///
/// A period lies within one calendar month, so its start and end dates
/// attribute it to the same month and year for monthly, annual and
/// year-to-date figures.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
/// ).unwrap();
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// The date the employee is paid.
    pub payment_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a pay period, rejecting an end date before the start date or
    /// in a different calendar month.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        payment_date: NaiveDate,
    ) -> EngineResult<Self> {
        let period = Self {
            start_date,
            end_date,
            payment_date,
        };
        period.validate()?;
        Ok(period)
    }

    /// Checks that `start_date <= end_date` and both fall in the same
    /// calendar month.
    ///
    /// Periods deserialized from input bypass [`PayPeriod::new`], so the
    /// builder calls this before using one.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date < self.start_date {
            return Err(EngineError::invalid_period(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        let start = (self.start_date.year(), self.start_date.month());
        let end = (self.end_date.year(), self.end_date.month());
        if start != end {
            return Err(EngineError::invalid_period(format!(
                "period {} to {} crosses a month boundary",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    /// Checks if a given date falls within this pay period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if the two periods share at least one day.
    pub fn overlaps(&self, other: &PayPeriod) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// The `(year, month)` the period is attributed to, by its start date.
    pub fn year_month(&self) -> (i32, u32) {
        (self.start_date.year(), self.start_date.month())
    }

    /// Which half of its month the period belongs to under `scheme`.
    pub fn half(&self, scheme: &PeriodScheme) -> PeriodHalf {
        scheme.half_of(self.start_date)
    }
}
