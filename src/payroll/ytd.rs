//! Year-to-date running totals per employee.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::PayPeriod;

/// One employee's running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdEntry {
    /// Gross salary so far this fiscal year.
    pub gross: Decimal,
    /// Tax-free portion so far this fiscal year.
    pub tax_free: Decimal,
    /// Start of the last recorded period.
    pub last_period_start: NaiveDate,
    /// End of the last recorded period.
    pub last_period_end: NaiveDate,
}

/// YTD totals as of one period's end, embedded in the record built for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdSnapshot {
    /// Gross including the period.
    pub gross: Decimal,
    /// Tax-free including the period.
    pub tax_free: Decimal,
}

/// Running (gross, tax-free) totals per employee for one fiscal year.
///
/// Owned by the caller and passed by `&mut` into the builder. Updates must
/// arrive in period order per employee; an earlier period than the last one
/// recorded is rejected with `OutOfOrderUpdate`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use payroll_engine::payroll::YtdAccumulator;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut ytd = YtdAccumulator::new(2025);
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
/// ).unwrap();
///
/// let snapshot = ytd.record("01012020-123X", &period, Decimal::from(2000), Decimal::ZERO).unwrap();
/// assert_eq!(snapshot.gross, Decimal::from(2000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtdAccumulator {
    fiscal_year: i32,
    entries: HashMap<String, YtdEntry>,
}

impl YtdAccumulator {
    /// Creates an empty accumulator for a fiscal year.
    pub fn new(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            entries: HashMap::new(),
        }
    }

    /// The fiscal year being accumulated.
    pub fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }

    /// Clears all totals and starts a new fiscal year.
    pub fn reset_for_fiscal_year(&mut self, fiscal_year: i32) {
        info!(
            previous_year = self.fiscal_year,
            fiscal_year,
            employees = self.entries.len(),
            "Resetting YTD accumulator"
        );
        self.entries.clear();
        self.fiscal_year = fiscal_year;
    }

    /// The entry for an employee, if any period was recorded.
    pub fn get(&self, employee_id: &str) -> Option<&YtdEntry> {
        self.entries.get(employee_id)
    }

    /// YTD gross before the next period (zero if nothing recorded).
    pub fn gross(&self, employee_id: &str) -> Decimal {
        self.get(employee_id).map_or(Decimal::ZERO, |e| e.gross)
    }

    /// YTD tax-free before the next period (zero if nothing recorded).
    pub fn tax_free(&self, employee_id: &str) -> Decimal {
        self.get(employee_id).map_or(Decimal::ZERO, |e| e.tax_free)
    }

    /// Number of employees with recorded periods.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no period has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that `period` may be recorded next for `employee_id`.
    ///
    /// Fails with `InvalidPeriod` if the period ends outside the fiscal year
    /// and with `OutOfOrderUpdate` if it starts before the last recorded period.
    pub fn check(&self, employee_id: &str, period: &PayPeriod) -> EngineResult<()> {
        if period.end_date.year() != self.fiscal_year {
            return Err(EngineError::invalid_period(format!(
                "period ending {} is outside fiscal year {}",
                period.end_date, self.fiscal_year
            )));
        }

        if let Some(entry) = self.entries.get(employee_id) {
            if period.start_date < entry.last_period_start {
                warn!(
                    employee_id,
                    period_start = %period.start_date,
                    last_period_start = %entry.last_period_start,
                    "Rejected out-of-order YTD update"
                );
                return Err(EngineError::OutOfOrderUpdate {
                    employee_id: employee_id.to_string(),
                    period_start: period.start_date,
                    last_period_start: entry.last_period_start,
                });
            }
        }

        Ok(())
    }

    /// Adds a period's gross and tax-free portion, returning the totals including it.
    pub fn record(
        &mut self,
        employee_id: &str,
        period: &PayPeriod,
        gross: Decimal,
        tax_free: Decimal,
    ) -> EngineResult<YtdSnapshot> {
        if gross < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "ytd.gross",
                format!("{} must not be negative", gross),
            ));
        }
        if tax_free < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "ytd.tax_free",
                format!("{} must not be negative", tax_free),
            ));
        }
        self.check(employee_id, period)?;

        let entry = self
            .entries
            .entry(employee_id.to_string())
            .or_insert(YtdEntry {
                gross: Decimal::ZERO,
                tax_free: Decimal::ZERO,
                last_period_start: period.start_date,
                last_period_end: period.end_date,
            });
        entry.gross += gross;
        entry.tax_free += tax_free;
        entry.last_period_start = period.start_date;
        entry.last_period_end = period.end_date;

        debug!(
            employee_id,
            period_start = %period.start_date,
            ytd_gross = %entry.gross,
            ytd_tax_free = %entry.tax_free,
            "Updated YTD totals"
        );

        Ok(YtdSnapshot {
            gross: entry.gross,
            tax_free: entry.tax_free,
        })
    }

    /// A single-employee accumulator holding a copy of one employee's entry.
    ///
    /// The shard is the only writer for that employee until it is merged back.
    pub fn shard(&self, employee_id: &str) -> YtdAccumulator {
        let mut shard = YtdAccumulator::new(self.fiscal_year);
        if let Some(entry) = self.entries.get(employee_id) {
            shard.entries.insert(employee_id.to_string(), *entry);
        }
        shard
    }

    /// Folds a shard's entries back in, replacing this accumulator's entries.
    ///
    /// Fails with `InvalidPeriod` if the shard belongs to another fiscal year
    /// and with `OutOfOrderUpdate` if a shard entry is behind the entry here.
    pub fn merge(&mut self, shard: YtdAccumulator) -> EngineResult<()> {
        if shard.fiscal_year != self.fiscal_year {
            return Err(EngineError::invalid_period(format!(
                "cannot merge fiscal year {} into {}",
                shard.fiscal_year, self.fiscal_year
            )));
        }

        for (employee_id, entry) in &shard.entries {
            if let Some(existing) = self.entries.get(employee_id) {
                if entry.last_period_start < existing.last_period_start {
                    return Err(EngineError::OutOfOrderUpdate {
                        employee_id: employee_id.clone(),
                        period_start: entry.last_period_start,
                        last_period_start: existing.last_period_start,
                    });
                }
            }
        }

        self.entries.extend(shard.entries);
        Ok(())
    }
}
