//! Primary-jurisdiction withholding and the double-taxation policy.
//!
//! The bracket is chosen from YTD gross including this period: the base rate
//! while it stays within the annual income limit, the additional rate once it
//! exceeds it. The chosen rate applies to this period's gross only. Earlier
//! periods are never corrected when the limit is crossed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DoubleTaxationPolicy, PrimaryTaxConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, round_money};

/// Which primary-jurisdiction rate applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBracket {
    /// YTD gross within the annual income limit.
    Base,
    /// YTD gross above the annual income limit.
    Additional,
}

/// The result of calculating primary-jurisdiction withholding.
#[derive(Debug, Clone)]
pub struct PrimaryTaxResult {
    /// Withholding for the period (≤ 0).
    pub withholding: Decimal,
    /// The bracket used.
    pub bracket: TaxBracket,
    /// The rate used.
    pub rate: Decimal,
    /// YTD gross including this period.
    pub ytd_including: Decimal,
    /// True if YTD gross was within the limit before this period and above it after.
    pub crossed_mid_period: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates primary-jurisdiction withholding for one period.
///
/// # Errors
///
/// Returns `InvalidInput` if `gross_salary` or `ytd_gross_before` is negative.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{TaxBracket, calculate_primary_withholding};
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = PayrollConfig::default();
/// let result = calculate_primary_withholding(
///     Decimal::from(2000),
///     Decimal::ZERO,
///     config.primary(),
///     1,
/// ).unwrap();
///
/// assert_eq!(result.bracket, TaxBracket::Base);
/// assert_eq!(result.withholding, Decimal::from_str("-330.00").unwrap());
/// ```
pub fn calculate_primary_withholding(
    gross_salary: Decimal,
    ytd_gross_before: Decimal,
    config: &PrimaryTaxConfig,
    step_number: u32,
) -> EngineResult<PrimaryTaxResult> {
    if gross_salary < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("{} must not be negative", gross_salary),
        ));
    }
    if ytd_gross_before < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "ytd_gross_before",
            format!("{} must not be negative", ytd_gross_before),
        ));
    }

    let limit = config.annual_income_limit;
    let ytd_including = ytd_gross_before + gross_salary;

    let (bracket, rate) = if ytd_including <= limit {
        (TaxBracket::Base, config.base_rate)
    } else {
        (TaxBracket::Additional, config.additional_rate)
    };
    let crossed_mid_period = ytd_gross_before <= limit && ytd_including > limit;

    let withholding = -round_money(gross_salary * rate);

    let reasoning = match bracket {
        TaxBracket::Base => format!(
            "YTD {} within limit {}: {} × {} = {}",
            ytd_including,
            limit,
            gross_salary,
            rate.normalize(),
            withholding.abs()
        ),
        TaxBracket::Additional if crossed_mid_period => format!(
            "YTD {} crossed limit {} this period: additional rate {} on this period only, {} × {} = {}",
            ytd_including,
            limit,
            rate.normalize(),
            gross_salary,
            rate.normalize(),
            withholding.abs()
        ),
        TaxBracket::Additional => format!(
            "YTD {} above limit {}: {} × {} = {}",
            ytd_including,
            limit,
            gross_salary,
            rate.normalize(),
            withholding.abs()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "primary_withholding".to_string(),
        rule_name: "Primary Jurisdiction Withholding".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "ytd_gross_before": ytd_gross_before.to_string(),
            "annual_income_limit": limit.to_string(),
            "tax_card_type": config.tax_card_type,
        }),
        output: serde_json::json!({
            "bracket": bracket,
            "rate": rate.normalize().to_string(),
            "ytd_including": ytd_including.to_string(),
            "withholding": withholding.to_string(),
            "crossed_mid_period": crossed_mid_period,
        }),
        reasoning,
    };

    Ok(PrimaryTaxResult {
        withholding,
        bracket,
        rate,
        ytd_including,
        crossed_mid_period,
        audit_step,
    })
}

/// The result of applying the double-taxation policy.
#[derive(Debug, Clone)]
pub struct DoubleTaxationResult {
    /// Withholding after the policy (≤ 0).
    pub withholding: Decimal,
    /// True if the policy changed the withholding.
    pub adjusted: bool,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Adjusts primary withholding when secondary-jurisdiction tax is also deducted.
///
/// Without secondary deductions the withholding is returned unchanged
/// whatever the policy.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_double_taxation_policy;
/// use payroll_engine::config::DoubleTaxationPolicy;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let policy = DoubleTaxationPolicy::Scale { factor: Decimal::from_str("0.3").unwrap() };
/// let result = apply_double_taxation_policy(
///     Decimal::from_str("-330.00").unwrap(),
///     true,
///     policy,
///     1,
/// );
/// assert_eq!(result.withholding, Decimal::from_str("-99.00").unwrap());
/// ```
pub fn apply_double_taxation_policy(
    withholding: Decimal,
    secondary_tax_applied: bool,
    policy: DoubleTaxationPolicy,
    step_number: u32,
) -> DoubleTaxationResult {
    let adjusted_withholding = if !secondary_tax_applied {
        withholding
    } else {
        match policy {
            DoubleTaxationPolicy::Full => withholding,
            DoubleTaxationPolicy::Waive => Decimal::ZERO,
            DoubleTaxationPolicy::Scale { factor } => round_money(withholding * factor),
        }
    };
    let adjusted = adjusted_withholding != withholding;

    let reasoning = if !secondary_tax_applied {
        "No secondary-jurisdiction tax this period - withholding unchanged".to_string()
    } else {
        match policy {
            DoubleTaxationPolicy::Full => {
                "Policy 'full': withholding applied alongside secondary tax".to_string()
            }
            DoubleTaxationPolicy::Waive => {
                "Policy 'waive': secondary tax deducted, primary withholding removed".to_string()
            }
            DoubleTaxationPolicy::Scale { factor } => format!(
                "Policy 'scale': {} × {} = {}",
                withholding.abs(),
                factor.normalize(),
                adjusted_withholding.abs()
            ),
        }
    };

    DoubleTaxationResult {
        withholding: adjusted_withholding,
        adjusted,
        audit_step: AuditStep {
            step_number,
            rule_id: "double_taxation".to_string(),
            rule_name: "Double Taxation Policy".to_string(),
            input: serde_json::json!({
                "withholding": withholding.to_string(),
                "secondary_tax_applied": secondary_tax_applied,
                "policy": policy,
            }),
            output: serde_json::json!({
                "withholding": adjusted_withholding.to_string(),
                "adjusted": adjusted,
            }),
            reasoning,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_config(limit: &str) -> PrimaryTaxConfig {
        PrimaryTaxConfig {
            jurisdiction: "FI".to_string(),
            tax_card_type: "Perus".to_string(),
            base_rate: dec("0.165"),
            additional_rate: dec("0.44"),
            annual_income_limit: dec(limit),
            double_taxation: DoubleTaxationPolicy::Full,
        }
    }

    #[test]
    fn test_base_rate_within_limit() {
        let result =
            calculate_primary_withholding(dec("2000"), Decimal::ZERO, &create_test_config("3900"), 1)
                .unwrap();

        assert_eq!(result.bracket, TaxBracket::Base);
        assert_eq!(result.ytd_including, dec("2000"));
        assert_eq!(result.withholding, dec("-330.00"));
        assert!(!result.crossed_mid_period);
    }

    #[test]
    fn test_limit_is_inclusive() {
        let result =
            calculate_primary_withholding(dec("1900"), dec("2000"), &create_test_config("3900"), 1)
                .unwrap();
        assert_eq!(result.bracket, TaxBracket::Base);
    }

    #[test]
    fn test_additional_rate_when_period_crosses_limit() {
        let result =
            calculate_primary_withholding(dec("2000"), dec("2000"), &create_test_config("3900"), 2)
                .unwrap();

        assert_eq!(result.bracket, TaxBracket::Additional);
        assert_eq!(result.ytd_including, dec("4000"));
        assert_eq!(result.rate, dec("0.44"));
        // Additional rate on this period's gross only
        assert_eq!(result.withholding, dec("-880.00"));
        assert!(result.crossed_mid_period);
    }

    #[test]
    fn test_already_above_limit_is_not_a_crossing() {
        let result =
            calculate_primary_withholding(dec("500"), dec("4000"), &create_test_config("3900"), 1)
                .unwrap();
        assert_eq!(result.bracket, TaxBracket::Additional);
        assert!(!result.crossed_mid_period);
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let config = create_test_config("3900");
        assert!(matches!(
            calculate_primary_withholding(dec("-1"), Decimal::ZERO, &config, 1),
            Err(EngineError::InvalidInput { .. })
        ));
        assert!(matches!(
            calculate_primary_withholding(dec("1"), dec("-1"), &config, 1),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_policy_only_applies_with_secondary_tax() {
        let result =
            apply_double_taxation_policy(dec("-330.00"), false, DoubleTaxationPolicy::Waive, 1);
        assert_eq!(result.withholding, dec("-330.00"));
        assert!(!result.adjusted);
    }

    #[test]
    fn test_waive_policy_zeroes_withholding() {
        let result =
            apply_double_taxation_policy(dec("-330.00"), true, DoubleTaxationPolicy::Waive, 1);
        assert_eq!(result.withholding, Decimal::ZERO);
        assert!(result.adjusted);
    }

    #[test]
    fn test_full_policy_keeps_withholding() {
        let result =
            apply_double_taxation_policy(dec("-330.00"), true, DoubleTaxationPolicy::Full, 1);
        assert_eq!(result.withholding, dec("-330.00"));
        assert!(!result.adjusted);
    }

    #[test]
    fn test_scale_policy_rounds_to_cents() {
        let policy = DoubleTaxationPolicy::Scale { factor: dec("0.3") };
        let result = apply_double_taxation_policy(dec("-100.05"), true, policy, 1);
        // -100.05 × 0.3 = -30.015
        assert_eq!(result.withholding, dec("-30.02"));
    }
}
