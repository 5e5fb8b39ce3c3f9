//! Employee insurance contributions.

use rust_decimal::Decimal;

use crate::config::InsuranceConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, round_money};

/// The result of calculating insurance contributions.
#[derive(Debug, Clone)]
pub struct InsuranceResult {
    /// Pension insurance premium (≤ 0), netted against pay.
    pub pension: Decimal,
    /// Health insurance contribution (≥ 0), informational only.
    pub health: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates pension and health insurance on one period's gross.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_insurance;
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = PayrollConfig::default();
/// let result = calculate_insurance(Decimal::from(1000), config.insurance(), 1).unwrap();
///
/// assert_eq!(result.pension, Decimal::from_str("-71.50").unwrap());
/// assert_eq!(result.health, Decimal::from_str("8.40").unwrap());
/// ```
pub fn calculate_insurance(
    gross_salary: Decimal,
    config: &InsuranceConfig,
    step_number: u32,
) -> EngineResult<InsuranceResult> {
    if gross_salary < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("{} must not be negative", gross_salary),
        ));
    }

    let pension = -round_money(gross_salary * config.pension_rate);
    let health = round_money(gross_salary * config.health_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "insurance".to_string(),
        rule_name: "Pension and Health Insurance".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "pension_rate": config.pension_rate.to_string(),
            "health_rate": config.health_rate.to_string(),
        }),
        output: serde_json::json!({
            "pension": pension.to_string(),
            "health": health.to_string(),
        }),
        reasoning: format!(
            "Pension {} × {} = {}; health {} × {} = {} (reported, not deducted)",
            gross_salary,
            config.pension_rate.normalize(),
            pension.abs(),
            gross_salary,
            config.health_rate.normalize(),
            health
        ),
    };

    Ok(InsuranceResult {
        pension,
        health,
        audit_step,
    })
}
