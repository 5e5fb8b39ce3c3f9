//! Secondary-jurisdiction withholding.
//!
//! Gross above the per-period threshold is taxed at a flat rate, and a fixed
//! standard deduction for tax on non-cash allowances is withheld alongside it.
//! Gross at or below the threshold produces no deductions at all.

use rust_decimal::Decimal;

use crate::config::SecondaryTaxConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Deduction, DeductionCode, DeductionKind, round_money};

/// Name segment of the income tax deduction code.
pub const SECONDARY_INCOME_TAX: &str = "INCOME";

/// Name segment of the standard allowance deduction code.
pub const SECONDARY_ALLOWANCE_TAX: &str = "ALLOWANCE";

/// The result of calculating secondary-jurisdiction withholding.
#[derive(Debug, Clone)]
pub struct SecondaryTaxResult {
    /// Gross above the threshold; zero or negative means untaxed.
    pub taxable: Decimal,
    /// Either empty or exactly two negative deductions.
    pub deductions: Vec<Deduction>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

impl SecondaryTaxResult {
    /// Sum of the produced deductions (≤ 0).
    pub fn total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }
}

/// Calculates secondary-jurisdiction deductions for one period's gross.
///
/// # Errors
///
/// Returns `InvalidInput` if `gross_salary` or the configured threshold is
/// negative.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_secondary_tax;
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = PayrollConfig::default();
/// let result = calculate_secondary_tax(Decimal::from(1000), config.secondary(), 1).unwrap();
///
/// assert_eq!(result.deductions.len(), 2);
/// assert_eq!(result.deductions[0].amount, Decimal::from_str("-50.10").unwrap());
/// assert_eq!(result.deductions[1].amount, Decimal::from_str("-217.78").unwrap());
/// ```
pub fn calculate_secondary_tax(
    gross_salary: Decimal,
    config: &SecondaryTaxConfig,
    step_number: u32,
) -> EngineResult<SecondaryTaxResult> {
    if gross_salary < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("{} must not be negative", gross_salary),
        ));
    }
    if config.threshold < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "secondary.threshold",
            format!("{} must not be negative", config.threshold),
        ));
    }

    let taxable = gross_salary - config.threshold;

    if taxable <= Decimal::ZERO {
        let audit_step = AuditStep {
            step_number,
            rule_id: "secondary_tax".to_string(),
            rule_name: "Secondary Jurisdiction Tax".to_string(),
            input: serde_json::json!({
                "gross_salary": gross_salary.to_string(),
                "threshold": config.threshold.to_string(),
            }),
            output: serde_json::json!({
                "taxable": "0.00",
                "deductions": 0,
            }),
            reasoning: format!(
                "Gross {} does not exceed the {} threshold {} - no deductions",
                gross_salary, config.jurisdiction, config.threshold
            ),
        };

        return Ok(SecondaryTaxResult {
            taxable,
            deductions: Vec::new(),
            audit_step,
        });
    }

    let income_tax = -round_money(taxable * config.rate);
    let allowance_tax = -round_money(config.standard_allowance_deduction);

    let deductions = vec![
        Deduction::new(
            &DeductionCode::new(DeductionKind::Tax, &config.jurisdiction, SECONDARY_INCOME_TAX),
            format!("{} income tax", config.jurisdiction),
            income_tax,
        ),
        Deduction::new(
            &DeductionCode::new(DeductionKind::Tax, &config.jurisdiction, SECONDARY_ALLOWANCE_TAX),
            format!("{} tax on allowances", config.jurisdiction),
            allowance_tax,
        ),
    ];

    let audit_step = AuditStep {
        step_number,
        rule_id: "secondary_tax".to_string(),
        rule_name: "Secondary Jurisdiction Tax".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "threshold": config.threshold.to_string(),
            "rate": config.rate.to_string(),
            "standard_allowance_deduction": config.standard_allowance_deduction.to_string(),
        }),
        output: serde_json::json!({
            "taxable": taxable.to_string(),
            "income_tax": income_tax.to_string(),
            "allowance_tax": allowance_tax.to_string(),
        }),
        reasoning: format!(
            "({} - {}) × {} = {}; standard allowance deduction {}",
            gross_salary,
            config.threshold,
            config.rate.normalize(),
            income_tax.abs(),
            allowance_tax.abs()
        ),
    };

    Ok(SecondaryTaxResult {
        taxable,
        deductions,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_config() -> SecondaryTaxConfig {
        SecondaryTaxConfig {
            jurisdiction: "SE".to_string(),
            threshold: dec("833.00"),
            rate: dec("0.30"),
            standard_allowance_deduction: dec("217.78"),
            allowance_tax_rate: dec("0.30"),
        }
    }

    #[test]
    fn test_gross_above_threshold_produces_two_deductions() {
        let result = calculate_secondary_tax(dec("1000"), &create_test_config(), 1).unwrap();

        assert_eq!(result.taxable, dec("167.00"));
        assert_eq!(result.deductions.len(), 2);
        assert_eq!(result.deductions[0].code, "TAX/SE/INCOME");
        assert_eq!(result.deductions[0].amount, dec("-50.10"));
        assert_eq!(result.deductions[1].code, "TAX/SE/ALLOWANCE");
        assert_eq!(result.deductions[1].amount, dec("-217.78"));
        assert_eq!(result.total(), dec("-267.88"));
    }

    #[test]
    fn test_gross_below_threshold_produces_nothing() {
        let result = calculate_secondary_tax(dec("500"), &create_test_config(), 1).unwrap();
        assert!(result.deductions.is_empty());
        assert_eq!(result.total(), Decimal::ZERO);
    }

    #[test]
    fn test_gross_equal_to_threshold_produces_nothing() {
        let result = calculate_secondary_tax(dec("833.00"), &create_test_config(), 1).unwrap();
        assert!(result.deductions.is_empty());
    }

    #[test]
    fn test_zero_gross() {
        let result = calculate_secondary_tax(Decimal::ZERO, &create_test_config(), 1).unwrap();
        assert!(result.deductions.is_empty());
    }

    #[test]
    fn test_income_tax_is_rounded_to_cents() {
        // (1000.05 - 833.00) × 0.30 = 50.115
        let result = calculate_secondary_tax(dec("1000.05"), &create_test_config(), 1).unwrap();
        assert_eq!(result.deductions[0].amount, dec("-50.12"));
    }

    #[test]
    fn test_negative_gross_is_rejected() {
        match calculate_secondary_tax(dec("-1"), &create_test_config(), 1) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "gross_salary"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let mut config = create_test_config();
        config.threshold = dec("-833.00");
        match calculate_secondary_tax(dec("1000"), &config, 1) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "secondary.threshold"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_audit_step_records_decision() {
        let result = calculate_secondary_tax(dec("1000"), &create_test_config(), 4).unwrap();
        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "secondary_tax");
        assert_eq!(result.audit_step.output["income_tax"], "-50.10");
    }
}
