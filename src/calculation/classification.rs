//! Code-driven classification of line items and deductions.
//!
//! Categories come from the configured prefix tables; the longest matching
//! prefix wins and unmatched codes fall into `Other`. Descriptions are never
//! inspected.

use rust_decimal::Decimal;

use crate::config::{ClassificationConfig, PayrollConfig};
use crate::models::{Deduction, DeductionKind, LineCategory, PayrollRecord};

/// Classifies codes against one configuration's prefix tables.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::Classifier;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{DeductionKind, LineCategory};
///
/// let config = PayrollConfig::default();
/// let classifier = Classifier::new(&config);
///
/// assert_eq!(classifier.line_category("12101"), LineCategory::Salary);
/// assert_eq!(classifier.line_category("12101_2"), LineCategory::Overtime);
/// assert_eq!(classifier.deduction_kind("TAX/SE/INCOME"), DeductionKind::Tax);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    tables: &'a ClassificationConfig,
    secondary_jurisdiction: &'a str,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier over the configuration's prefix tables.
    pub fn new(config: &'a PayrollConfig) -> Self {
        Self {
            tables: config.classification(),
            secondary_jurisdiction: &config.secondary().jurisdiction,
        }
    }

    /// Category of a line-item code.
    pub fn line_category(&self, code: &str) -> LineCategory {
        self.tables
            .line_items
            .iter()
            .filter(|entry| code.starts_with(entry.prefix.as_str()))
            .max_by_key(|entry| entry.prefix.len())
            .map(|entry| entry.category)
            .unwrap_or(LineCategory::Other)
    }

    /// Kind of a deduction code.
    pub fn deduction_kind(&self, code: &str) -> DeductionKind {
        self.tables
            .deductions
            .iter()
            .filter(|entry| code.starts_with(entry.prefix.as_str()))
            .max_by_key(|entry| entry.prefix.len())
            .map(|entry| entry.kind)
            .unwrap_or(DeductionKind::Other)
    }

    /// True for a tax deduction whose jurisdiction segment is the secondary jurisdiction.
    pub fn is_secondary_tax(&self, deduction: &Deduction) -> bool {
        self.deduction_kind(&deduction.code) == DeductionKind::Tax
            && deduction
                .parsed_code()
                .is_ok_and(|code| code.jurisdiction == self.secondary_jurisdiction)
    }

    /// Secondary-jurisdiction tax on a record, as a positive magnitude.
    pub fn secondary_tax(&self, record: &PayrollRecord) -> Decimal {
        -record
            .deductions
            .iter()
            .filter(|d| self.is_secondary_tax(d))
            .map(|d| d.amount)
            .sum::<Decimal>()
    }

    /// Summed quantities of a record's salary items in `category`.
    pub fn hours_in(&self, record: &PayrollRecord, category: LineCategory) -> Decimal {
        record
            .salary_items
            .iter()
            .filter(|item| self.line_category(&item.code) == category)
            .filter_map(|item| item.quantity)
            .sum()
    }
}
