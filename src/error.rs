//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report. All failures are local and
//! deterministic: a given invalid input always fails the same way.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// The builder, accumulator and aggregation functions surface these errors
/// to their caller unmodified. Whether to skip an employee or abort a run is
/// left to the caller.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::UnknownEmployee {
///     employee_id: "01012020-123X".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown employee: 01012020-123X");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A numeric input was malformed (negative hours, rates, gross, ...).
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The input field that was rejected.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// A pay period was malformed or overlapped a prior period.
    #[error("Invalid period: {message}")]
    InvalidPeriod {
        /// A description of the period violation.
        message: String,
    },

    /// The employee identifier is not present in the roster.
    #[error("Unknown employee: {employee_id}")]
    UnknownEmployee {
        /// The identifier that was looked up.
        employee_id: String,
    },

    /// A YTD update was submitted for a period earlier than the last one seen.
    #[error(
        "Out-of-order YTD update for '{employee_id}': period starting {period_start} \
         is earlier than last recorded period starting {last_period_start}"
    )]
    OutOfOrderUpdate {
        /// The employee whose accumulator rejected the update.
        employee_id: String,
        /// Start of the rejected period.
        period_start: NaiveDate,
        /// Start of the last period recorded for the employee.
        last_period_start: NaiveDate,
    },

    /// A currency rate was zero or negative.
    #[error("Invalid currency rate: {rate} (must be positive)")]
    InvalidRate {
        /// The rejected rate.
        rate: Decimal,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidPeriod`].
    pub fn invalid_period(message: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("gross_salary", "must not be negative");
        assert_eq!(
            error.to_string(),
            "Invalid input 'gross_salary': must not be negative"
        );
    }

    #[test]
    fn test_invalid_period_displays_message() {
        let error = EngineError::invalid_period("end date 2025-01-01 is before start date 2025-01-15");
        assert_eq!(
            error.to_string(),
            "Invalid period: end date 2025-01-01 is before start date 2025-01-15"
        );
    }

    #[test]
    fn test_unknown_employee_displays_id() {
        let error = EngineError::UnknownEmployee {
            employee_id: "99999999-000A".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown employee: 99999999-000A");
    }

    #[test]
    fn test_out_of_order_displays_both_dates() {
        let error = EngineError::OutOfOrderUpdate {
            employee_id: "01012020-123X".to_string(),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            last_period_start: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
        };
        let message = error.to_string();
        assert!(message.contains("01012020-123X"));
        assert!(message.contains("2025-01-01"));
        assert!(message.contains("2025-01-16"));
    }

    #[test]
    fn test_invalid_rate_displays_rate() {
        let error = EngineError::InvalidRate {
            rate: Decimal::from_str("-0.086").unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid currency rate: -0.086 (must be positive)"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/payroll.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/payroll.yaml"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_unknown() -> EngineResult<()> {
            Err(EngineError::UnknownEmployee {
                employee_id: "x".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_unknown()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
