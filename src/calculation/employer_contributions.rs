//! Secondary-jurisdiction employer contributions.

use rust_decimal::Decimal;

use crate::config::EmployerContributionConfig;
use crate::models::{ContributionLine, EmployerContributions, round_money};

/// Calculates employer contributions on a cash-salary base.
///
/// The total is `base × rate`. Each configured component is `base × share`,
/// so with shares summing to the rate the components add up to the total
/// within a cent per component.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_employer_contributions;
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = PayrollConfig::default();
/// let result = calculate_employer_contributions(
///     Decimal::from(10000),
///     config.employer_contributions(),
/// );
/// assert_eq!(result.total, Decimal::from_str("3142.00").unwrap());
/// assert_eq!(result.components[0].amount, Decimal::from_str("1042.00").unwrap());
/// ```
pub fn calculate_employer_contributions(
    base: Decimal,
    config: &EmployerContributionConfig,
) -> EmployerContributions {
    let components = config
        .components
        .iter()
        .map(|component| ContributionLine {
            name: component.name.clone(),
            amount: round_money(base * component.share),
        })
        .collect();

    EmployerContributions {
        base,
        components,
        total: round_money(base * config.rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayrollConfig;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_components_follow_configured_order() {
        let config = PayrollConfig::default();
        let result = calculate_employer_contributions(dec("10000"), config.employer_contributions());

        let names: Vec<&str> = result.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["pension", "sickness_insurance", "work_injury", "other"]);
        assert_eq!(result.components[3].amount, dec("1664.00"));
    }

    #[test]
    fn test_components_sum_to_total_within_rounding() {
        let config = PayrollConfig::default();
        let result =
            calculate_employer_contributions(dec("12345.67"), config.employer_contributions());

        let sum: Decimal = result.components.iter().map(|c| c.amount).sum();
        assert!((sum - result.total).abs() <= dec("0.04"));
        // 12345.67 × 0.3142 = 3879.009514
        assert_eq!(result.total, dec("3879.01"));
        // 1286.42 + 454.32 + 83.95 + 2054.32
        assert_eq!(sum, dec("3879.01"));
    }

    #[test]
    fn test_zero_base() {
        let config = PayrollConfig::default();
        let result = calculate_employer_contributions(Decimal::ZERO, config.employer_contributions());
        assert_eq!(result.total, Decimal::ZERO);
        assert!(result.components.iter().all(|c| c.amount == Decimal::ZERO));
    }
}
