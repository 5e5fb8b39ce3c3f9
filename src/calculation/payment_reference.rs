//! Payment due date and OCR reference for the employer declaration.
//!
//! Declared tax and contributions for a month are due on a fixed day of the
//! following month and are paid against a numeric reference whose last digit
//! is a Luhn (mod 10) check digit.

use chrono::{Months, NaiveDate};

use crate::error::{EngineError, EngineResult};

/// Due date for the amounts declared for `year`-`month`.
///
/// # Errors
///
/// Returns `InvalidPeriod` if the month is invalid or `due_day` does not
/// exist in the following month.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::payment_due_date;
///
/// let due = payment_due_date(2025, 12, 12).unwrap();
/// assert_eq!(due, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// ```
pub fn payment_due_date(year: i32, month: u32, due_day: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, due_day)
        .and_then(|date| date.checked_add_months(Months::new(1)))
        .ok_or_else(|| {
            EngineError::invalid_period(format!(
                "no due day {} after {}-{:02}",
                due_day, year, month
            ))
        })
}

/// Luhn check digit for a string of decimal digits.
///
/// # Errors
///
/// Returns `InvalidInput` if `digits` is empty or contains a non-digit.
pub fn luhn_check_digit(digits: &str) -> EngineResult<u32> {
    let values = digit_values(digits)?;
    // The check digit takes the rightmost position, so doubling starts at
    // the last payload digit.
    let sum: u32 = values
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { luhn_double(d) } else { d })
        .sum();
    Ok((10 - sum % 10) % 10)
}

/// True if `reference` is all digits and passes the Luhn check.
pub fn is_valid_luhn(reference: &str) -> bool {
    match digit_values(reference) {
        Ok(values) => {
            let sum: u32 = values
                .iter()
                .rev()
                .enumerate()
                .map(|(i, &d)| if i % 2 == 1 { luhn_double(d) } else { d })
                .sum();
            sum % 10 == 0
        }
        Err(_) => false,
    }
}

/// OCR reference for a month's payment: `YYYYMM`, the employer prefix and a
/// Luhn check digit.
///
/// # Errors
///
/// Returns `InvalidInput` if `employer_prefix` is not all digits, and
/// `InvalidPeriod` if `month` is not 1–12.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::ocr_reference;
///
/// assert_eq!(ocr_reference(2025, 1, "556789").unwrap(), "2025015567899");
/// ```
pub fn ocr_reference(year: i32, month: u32, employer_prefix: &str) -> EngineResult<String> {
    if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
        return Err(EngineError::invalid_period(format!(
            "{}-{:02} is not a valid declaration month",
            year, month
        )));
    }
    let payload = format!("{:04}{:02}{}", year, month, employer_prefix);
    let check = luhn_check_digit(&payload)?;
    Ok(format!("{}{}", payload, check))
}

fn digit_values(digits: &str) -> EngineResult<Vec<u32>> {
    if digits.is_empty() {
        return Err(EngineError::invalid_input("reference", "no digits"));
    }
    digits
        .chars()
        .map(|c| {
            c.to_digit(10).ok_or_else(|| {
                EngineError::invalid_input("reference", format!("'{}' is not all digits", digits))
            })
        })
        .collect()
}

fn luhn_double(digit: u32) -> u32 {
    let doubled = digit * 2;
    if doubled > 9 { doubled - 9 } else { doubled }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_is_in_following_month() {
        assert_eq!(payment_due_date(2025, 1, 12).unwrap(), date(2025, 2, 12));
        assert_eq!(payment_due_date(2025, 12, 12).unwrap(), date(2026, 1, 12));
    }

    #[test]
    fn test_due_date_rejects_invalid_month() {
        assert!(matches!(
            payment_due_date(2025, 13, 12),
            Err(EngineError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_luhn_check_digit_known_values() {
        // Standard Luhn example: 7992739871 → 3
        assert_eq!(luhn_check_digit("7992739871").unwrap(), 3);
        assert!(is_valid_luhn("79927398713"));
        assert!(!is_valid_luhn("79927398710"));
    }

    #[test]
    fn test_luhn_rejects_non_digits() {
        assert!(luhn_check_digit("").is_err());
        assert!(luhn_check_digit("12a4").is_err());
        assert!(!is_valid_luhn("12-4"));
    }

    #[test]
    fn test_ocr_reference_layout() {
        let reference = ocr_reference(2025, 1, "556789").unwrap();
        // 2025 01 556789 + check digit 9
        assert_eq!(reference, "2025015567899");
        assert!(is_valid_luhn(&reference));

        let december = ocr_reference(2025, 12, "556789").unwrap();
        assert!(december.starts_with("202512556789"));
        assert_eq!(december.len(), 13);
        assert!(is_valid_luhn(&december));
    }

    #[test]
    fn test_ocr_reference_rejects_bad_prefix() {
        assert!(matches!(
            ocr_reference(2025, 1, "55-789"),
            Err(EngineError::InvalidInput { .. })
        ));
        assert!(matches!(
            ocr_reference(2025, 0, "556789"),
            Err(EngineError::InvalidPeriod { .. })
        ));
    }
}
