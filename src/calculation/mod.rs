//! Calculation logic for the payroll engine.
//!
//! This module contains the pure rule functions: currency conversion,
//! secondary- and primary-jurisdiction withholding, the double-taxation
//! policy, insurance, employer contributions, code-driven classification and
//! the declaration payment reference.
//! Each rule returns its value together with the audit step that explains it.

mod classification;
mod currency;
mod employer_contributions;
mod insurance;
mod payment_reference;
mod primary_tax;
mod secondary_tax;

pub use classification::Classifier;
pub use currency::{CurrencyConverter, to_primary, to_secondary};
pub use employer_contributions::calculate_employer_contributions;
pub use insurance::{InsuranceResult, calculate_insurance};
pub use payment_reference::{is_valid_luhn, luhn_check_digit, ocr_reference, payment_due_date};
pub use primary_tax::{
    DoubleTaxationResult, PrimaryTaxResult, TaxBracket, apply_double_taxation_policy,
    calculate_primary_withholding,
};
pub use secondary_tax::{
    SECONDARY_ALLOWANCE_TAX, SECONDARY_INCOME_TAX, SecondaryTaxResult, calculate_secondary_tax,
};
