//! Raw per-period inputs fed to the record builder.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A worked quantity for one configured salary line-item code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkQuantity {
    /// Configured line-item code, e.g. "12101".
    pub code: String,
    /// Hours (or units) worked.
    pub quantity: Decimal,
}

/// Time-based inputs for one employee and one pay period.
///
/// Rates for multiplier-based line items derive from `base_hourly_rate`.
/// Line items with a fixed rate in the configuration ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInputs {
    /// The employee's base hourly rate.
    pub base_hourly_rate: Decimal,
    /// Quantities keyed by configured line-item code.
    #[serde(default)]
    pub quantities: Vec<WorkQuantity>,
}

impl WorkInputs {
    /// Creates work inputs with no quantities.
    pub fn new(base_hourly_rate: Decimal) -> Self {
        Self {
            base_hourly_rate,
            quantities: Vec::new(),
        }
    }

    /// Adds a quantity for a line-item code.
    pub fn with(mut self, code: impl Into<String>, quantity: Decimal) -> Self {
        self.quantities.push(WorkQuantity {
            code: code.into(),
            quantity,
        });
        self
    }

    /// Total quantity submitted for a code.
    pub fn quantity_for(&self, code: &str) -> Option<Decimal> {
        let mut matching = self.quantities.iter().filter(|q| q.code == code).peekable();
        matching.peek()?;
        Some(matching.map(|q| q.quantity).sum())
    }
}

/// Benefit inputs for one employee and one pay period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitInputs {
    /// Taxable travel compensation, a fixed amount.
    #[serde(default)]
    pub travel_compensation: Option<Decimal>,
    /// Number of per-diem days; paid tax-free at the configured daily rate.
    #[serde(default)]
    pub per_diem_days: Decimal,
}
