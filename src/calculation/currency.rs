//! Currency conversion between the primary and secondary currency.
//!
//! The rate is primary units per one secondary unit (0.086 EUR per SEK).
//! Conversion is full precision; callers round once per row or total.

use rust_decimal::Decimal;

use crate::config::CurrencyConfig;
use crate::error::{EngineError, EngineResult};

/// Converts `amount` in the primary currency to the secondary currency.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::to_secondary;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let sek = to_secondary(
///     Decimal::from_str("86").unwrap(),
///     Decimal::from_str("0.086").unwrap(),
/// ).unwrap();
/// assert_eq!(sek, Decimal::from(1000));
/// ```
pub fn to_secondary(amount: Decimal, rate: Decimal) -> EngineResult<Decimal> {
    check_rate(rate)?;
    amount
        .checked_div(rate)
        .ok_or_else(|| EngineError::invalid_input("amount", format!("{} / {} overflows", amount, rate)))
}

/// Converts `amount` in the secondary currency to the primary currency.
pub fn to_primary(amount: Decimal, rate: Decimal) -> EngineResult<Decimal> {
    check_rate(rate)?;
    amount
        .checked_mul(rate)
        .ok_or_else(|| EngineError::invalid_input("amount", format!("{} × {} overflows", amount, rate)))
}

fn check_rate(rate: Decimal) -> EngineResult<()> {
    if rate <= Decimal::ZERO {
        return Err(EngineError::InvalidRate { rate });
    }
    Ok(())
}

/// A validated conversion rate, built once from configuration and shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConverter {
    rate: Decimal,
}

impl CurrencyConverter {
    /// Creates a converter, rejecting a non-positive rate.
    pub fn new(rate: Decimal) -> EngineResult<Self> {
        check_rate(rate)?;
        Ok(Self { rate })
    }

    /// Creates a converter from the currency configuration.
    pub fn from_config(config: &CurrencyConfig) -> EngineResult<Self> {
        Self::new(config.rate)
    }

    /// The rate in use.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Primary to secondary.
    pub fn to_secondary(&self, amount: Decimal) -> EngineResult<Decimal> {
        to_secondary(amount, self.rate)
    }

    /// Secondary to primary.
    pub fn to_primary(&self, amount: Decimal) -> EngineResult<Decimal> {
        to_primary(amount, self.rate)
    }
}
