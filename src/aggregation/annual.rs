//! Annual per-employee and company-wide summaries.

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::calculation::Classifier;
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AnnualEmployeeSummary, AnnualFigures, CompanyAnnualSummary, Employee, LineCategory,
    PayrollRecord, Roster,
};

/// Sums one employee's records for a fiscal year.
///
/// Hours are re-derived by classifying each salary item's code. An employee
/// with no records gets an all-zero summary.
///
/// # Errors
///
/// Returns `InvalidInput` if a record belongs to another employee or ends
/// outside `year`.
pub fn annual_employee_summary<'r>(
    employee: &Employee,
    records: impl IntoIterator<Item = &'r PayrollRecord>,
    year: i32,
    config: &PayrollConfig,
) -> EngineResult<AnnualEmployeeSummary> {
    let classifier = Classifier::new(config);
    let mut figures = AnnualFigures::default();

    for record in records {
        if record.employee.id != employee.id {
            return Err(EngineError::invalid_input(
                "records",
                format!(
                    "record for '{}' in the annual summary of '{}'",
                    record.employee.id, employee.id
                ),
            ));
        }
        if record.period.end_date.year() != year {
            return Err(EngineError::invalid_input(
                "records",
                format!(
                    "record ending {} is outside fiscal year {}",
                    record.period.end_date, year
                ),
            ));
        }
        figures += record_figures(record, &classifier);
    }

    Ok(AnnualEmployeeSummary {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        year,
        figures,
    })
}

/// Sums every employee's records for a fiscal year.
///
/// Employees appear in identifier order; only employees with at least one
/// record are listed. Totals are the sum of the per-employee figures.
///
/// # Errors
///
/// Returns `UnknownEmployee` if a record's employee is not in the roster and
/// `InvalidInput` if a record ends outside `year`.
pub fn company_annual_summary(
    roster: &Roster,
    records: &[PayrollRecord],
    year: i32,
    config: &PayrollConfig,
) -> EngineResult<CompanyAnnualSummary> {
    let mut by_employee: BTreeMap<&str, Vec<&PayrollRecord>> = BTreeMap::new();
    for record in records {
        by_employee
            .entry(record.employee.id.as_str())
            .or_default()
            .push(record);
    }

    let mut employees = Vec::with_capacity(by_employee.len());
    for (employee_id, records) in by_employee {
        let employee = roster.get(employee_id)?;
        employees.push(annual_employee_summary(employee, records, year, config)?);
    }

    let totals: AnnualFigures = employees.iter().map(|summary| &summary.figures).sum();

    debug!(
        year,
        employees = employees.len(),
        records = totals.record_count,
        "Built company annual summary"
    );

    Ok(CompanyAnnualSummary {
        year,
        employees,
        totals,
    })
}

fn record_figures(record: &PayrollRecord, classifier: &Classifier<'_>) -> AnnualFigures {
    AnnualFigures {
        record_count: 1,
        gross: record.gross_salary,
        net: record.net_payment,
        secondary_tax: classifier.secondary_tax(record),
        primary_tax: -record.tax_withholding,
        pension: -record.pension_insurance,
        health: record.health_insurance,
        tax_free: record.tax_free_portion,
        regular_hours: classifier.hours_in(record, LineCategory::Salary),
        overtime_hours: classifier.hours_in(record, LineCategory::Overtime),
        supplement_hours: classifier.hours_in(record, LineCategory::Supplement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::tests::{create_test_employee, create_test_record, period};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_annual_employee_totals() {
        let config = PayrollConfig::default();
        let employee = create_test_employee("01011990-111A");
        let records = vec![
            create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("1000.00")),
            create_test_record("01011990-111A", period(2025, 1, 16, 31), dec("500.00")),
            create_test_record("01011990-111A", period(2025, 2, 1, 15), dec("1200.00")),
        ];

        let summary = annual_employee_summary(&employee, &records, 2025, &config).unwrap();
        let figures = &summary.figures;

        assert_eq!(figures.record_count, 3);
        assert_eq!(figures.gross, dec("2700.00"));
        assert_eq!(figures.tax_free, dec("408.00"));
        // Two records above the 833.00 threshold: (167 + 367) × 0.30 + 2 × 217.78
        assert_eq!(figures.secondary_tax, dec("595.76"));
        assert_eq!(figures.net, records.iter().map(|r| r.net_payment).sum::<Decimal>());
        assert_eq!(figures.average_gross(), dec("900.00"));
    }

    #[test]
    fn test_hours_by_classified_code() {
        let config = PayrollConfig::default();
        let employee = create_test_employee("01011990-111A");
        let records = vec![
            create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("1000.00")),
            create_test_record("01011990-111A", period(2025, 1, 16, 31), dec("1000.00")),
        ];

        let figures = annual_employee_summary(&employee, &records, 2025, &config)
            .unwrap()
            .figures;

        // Each fixture record: 40 h 12101, 2 h 12101_2, 4 h 12102, 10 h 12107
        assert_eq!(figures.regular_hours, dec("80"));
        assert_eq!(figures.overtime_hours, dec("12"));
        assert_eq!(figures.supplement_hours, dec("20"));
        assert_eq!(figures.total_hours(), dec("92"));
    }

    #[test]
    fn test_empty_year() {
        let config = PayrollConfig::default();
        let employee = create_test_employee("01011990-111A");

        let summary = annual_employee_summary(&employee, std::iter::empty(), 2025, &config).unwrap();
        assert_eq!(summary.figures, AnnualFigures::default());
        assert_eq!(summary.figures.average_gross(), Decimal::ZERO);
    }

    #[test]
    fn test_foreign_records_are_rejected() {
        let config = PayrollConfig::default();
        let employee = create_test_employee("01011990-111A");

        let other = vec![create_test_record(
            "02021985-222B",
            period(2025, 1, 1, 15),
            dec("1000.00"),
        )];
        assert!(matches!(
            annual_employee_summary(&employee, &other, 2025, &config),
            Err(EngineError::InvalidInput { .. })
        ));

        let last_year = vec![create_test_record(
            "01011990-111A",
            period(2024, 12, 16, 31),
            dec("1000.00"),
        )];
        assert!(matches!(
            annual_employee_summary(&employee, &last_year, 2025, &config),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_company_totals_equal_sum_of_employees() {
        let config = PayrollConfig::default();
        let roster = Roster::from_employees(vec![
            create_test_employee("02021985-222B"),
            create_test_employee("01011990-111A"),
        ])
        .unwrap();
        let records = vec![
            create_test_record("02021985-222B", period(2025, 1, 1, 15), dec("2000.00")),
            create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("1000.00")),
            create_test_record("01011990-111A", period(2025, 3, 1, 15), dec("700.00")),
        ];

        let company = company_annual_summary(&roster, &records, 2025, &config).unwrap();

        let ids: Vec<&str> = company.employees.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, ["01011990-111A", "02021985-222B"]);
        assert_eq!(company.totals.gross, dec("3700.00"));
        assert_eq!(company.totals.record_count, 3);
        let summed: AnnualFigures = company.employees.iter().map(|e| &e.figures).sum();
        assert_eq!(company.totals, summed);
    }

    #[test]
    fn test_company_summary_rejects_unknown_employee() {
        let config = PayrollConfig::default();
        let roster = Roster::new();
        let records = vec![create_test_record(
            "01011990-111A",
            period(2025, 1, 1, 15),
            dec("1000.00"),
        )];

        assert!(matches!(
            company_annual_summary(&roster, &records, 2025, &config),
            Err(EngineError::UnknownEmployee { .. })
        ));
    }
}
