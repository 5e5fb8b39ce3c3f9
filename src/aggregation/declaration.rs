//! Monthly employer declaration for the secondary jurisdiction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::{
    Classifier, CurrencyConverter, calculate_employer_contributions, ocr_reference,
    payment_due_date,
};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeclarationPerson, EmployerDeclaration, LineCategory, PayrollRecord, round_money,
};

use super::check_month;

/// One person's running totals, primary currency.
struct PersonTotals<'a> {
    name: &'a str,
    gross: Decimal,
    tax: Decimal,
    tax_free: Decimal,
    hours: Decimal,
}

/// Builds the employer declaration for one month.
///
/// Every amount is in the secondary currency. Each person's gross,
/// tax-free benefits and preliminary tax are summed in the primary currency
/// and converted once; the declaration totals are the sums of the person
/// lines. Employer contributions are charged on the cash salary, both per
/// person and for the declaration as a whole. The payment is due on the
/// configured day of the following month.
///
/// # Errors
///
/// Returns `InvalidPeriod` if a record's period does not start in
/// `year`-`month`, or if `month` is not 1–12.
pub fn employer_declaration(
    records: &[PayrollRecord],
    year: i32,
    month: u32,
    config: &PayrollConfig,
) -> EngineResult<EmployerDeclaration> {
    check_month(year, month)?;
    let converter = CurrencyConverter::from_config(config.currency())?;
    let classifier = Classifier::new(config);

    let mut people: BTreeMap<&str, PersonTotals<'_>> = BTreeMap::new();
    for record in records {
        if record.period.year_month() != (year, month) {
            return Err(EngineError::invalid_period(format!(
                "record for '{}' starting {} is outside {}-{:02}",
                record.employee.id, record.period.start_date, year, month
            )));
        }
        let totals = people
            .entry(record.employee.id.as_str())
            .or_insert_with(|| PersonTotals {
                name: record.employee.name.as_str(),
                gross: Decimal::ZERO,
                tax: Decimal::ZERO,
                tax_free: Decimal::ZERO,
                hours: Decimal::ZERO,
            });
        totals.gross += record.gross_salary;
        totals.tax += classifier.secondary_tax(record);
        totals.tax_free += record.tax_free_portion;
        totals.hours += classifier.hours_in(record, LineCategory::Salary)
            + classifier.hours_in(record, LineCategory::Overtime);
    }

    let mut persons = Vec::with_capacity(people.len());
    for (employee_id, totals) in people {
        let gross_secondary = round_money(converter.to_secondary(totals.gross)?);
        let tax_free_secondary = round_money(converter.to_secondary(totals.tax_free)?);
        persons.push(DeclarationPerson {
            employee_id: employee_id.to_string(),
            name: totals.name.to_string(),
            gross_secondary,
            tax_free_secondary,
            total_income_secondary: gross_secondary + tax_free_secondary,
            preliminary_tax_secondary: round_money(converter.to_secondary(totals.tax)?),
            contributions: calculate_employer_contributions(
                gross_secondary,
                config.employer_contributions(),
            ),
            hours: totals.hours,
        });
    }

    let cash_salary: Decimal = persons.iter().map(|p| p.gross_secondary).sum();
    let tax_free_benefits: Decimal = persons.iter().map(|p| p.tax_free_secondary).sum();
    let preliminary_tax: Decimal = persons.iter().map(|p| p.preliminary_tax_secondary).sum();
    let contributions =
        calculate_employer_contributions(cash_salary, config.employer_contributions());

    let declaration = config.declaration();
    let due_date = payment_due_date(year, month, declaration.payment_due_day)?;
    let ocr_reference = ocr_reference(year, month, declaration.reference_prefix())?;

    debug!(
        year,
        month,
        persons = persons.len(),
        cash_salary = %cash_salary,
        %due_date,
        "Built employer declaration"
    );

    Ok(EmployerDeclaration {
        year,
        month,
        employee_count: persons.len(),
        cash_salary,
        tax_free_benefits,
        total_remuneration: cash_salary + tax_free_benefits,
        preliminary_tax,
        total_to_pay: preliminary_tax + contributions.total,
        contributions,
        due_date,
        ocr_reference,
        persons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::tests::{create_test_record, period};
    use crate::calculation::is_valid_luhn;
    use crate::config::DeclarationConfig;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_declaration_totals() {
        let config = PayrollConfig::default();
        let records = vec![
            create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("860.00")),
            create_test_record("01011990-111A", period(2025, 1, 16, 31), dec("860.00")),
            create_test_record("02021985-222B", period(2025, 1, 1, 15), dec("430.00")),
        ];

        let declaration = employer_declaration(&records, 2025, 1, &config).unwrap();

        assert_eq!(declaration.employee_count, 2);
        // 1720 / 0.086 and 430 / 0.086
        assert_eq!(declaration.persons[0].gross_secondary, dec("20000.00"));
        assert_eq!(declaration.persons[1].gross_secondary, dec("5000.00"));
        assert_eq!(declaration.cash_salary, dec("25000.00"));
        // 3 × 136.00 = 408.00 / 0.086 = 4744.186...
        assert_eq!(declaration.tax_free_benefits, dec("4744.19"));
        assert_eq!(declaration.total_remuneration, dec("29744.19"));
        assert_eq!(declaration.contributions.total, dec("7855.00"));
        assert_eq!(
            declaration.total_to_pay,
            declaration.preliminary_tax + declaration.contributions.total
        );
    }

    #[test]
    fn test_person_lines_carry_benefits_contributions_and_hours() {
        let config = PayrollConfig::default();
        let records = vec![
            create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("860.00")),
            create_test_record("01011990-111A", period(2025, 1, 16, 31), dec("860.00")),
            create_test_record("02021985-222B", period(2025, 1, 1, 15), dec("430.00")),
        ];

        let declaration = employer_declaration(&records, 2025, 1, &config).unwrap();
        let first = &declaration.persons[0];
        let second = &declaration.persons[1];

        // 272.00 / 0.086 = 3162.790...
        assert_eq!(first.tax_free_secondary, dec("3162.79"));
        assert_eq!(first.total_income_secondary, dec("23162.79"));
        // 20000.00 × 0.3142
        assert_eq!(first.contributions.base, dec("20000.00"));
        assert_eq!(first.contributions.total, dec("6284.00"));
        // 40 regular + 6 overtime per record; evening hours are not counted again
        assert_eq!(first.hours, dec("92"));

        // 136.00 / 0.086 = 1581.395...
        assert_eq!(second.tax_free_secondary, dec("1581.40"));
        assert_eq!(second.total_income_secondary, dec("6581.40"));
        assert_eq!(second.contributions.total, dec("1571.00"));
        assert_eq!(second.hours, dec("46"));

        let tax_free: Decimal = declaration.persons.iter().map(|p| p.tax_free_secondary).sum();
        assert_eq!(declaration.tax_free_benefits, tax_free);
    }

    #[test]
    fn test_due_date_and_reference_from_config() {
        let config = PayrollConfig::default();
        let records = vec![create_test_record(
            "01011990-111A",
            period(2025, 1, 1, 15),
            dec("860.00"),
        )];

        let declaration = employer_declaration(&records, 2025, 1, &config).unwrap();

        assert_eq!(declaration.due_date, NaiveDate::from_ymd_opt(2025, 2, 12).unwrap());
        assert_eq!(declaration.ocr_reference, "2025015567899");
        assert!(is_valid_luhn(&declaration.ocr_reference));
    }

    #[test]
    fn test_december_declaration_is_due_next_year() {
        let config = PayrollConfig::default()
            .with_declaration(DeclarationConfig {
                organisation_number: "123456-7890".to_string(),
                payment_due_day: 5,
            })
            .unwrap();
        let records = vec![create_test_record(
            "01011990-111A",
            period(2025, 12, 1, 15),
            dec("860.00"),
        )];

        let declaration = employer_declaration(&records, 2025, 12, &config).unwrap();

        assert_eq!(declaration.due_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(declaration.ocr_reference, "2025121234566");
        assert!(is_valid_luhn(&declaration.ocr_reference));
    }

    #[test]
    fn test_preliminary_tax_from_secondary_deductions() {
        let config = PayrollConfig::default();
        let records = vec![create_test_record(
            "01011990-111A",
            period(2025, 1, 1, 15),
            dec("1000.00"),
        )];

        let declaration = employer_declaration(&records, 2025, 1, &config).unwrap();

        // 267.88 / 0.086 = 3114.883...
        assert_eq!(declaration.preliminary_tax, dec("3114.88"));
        assert_eq!(declaration.persons[0].preliminary_tax_secondary, dec("3114.88"));
    }

    #[test]
    fn test_record_outside_month_is_rejected() {
        let config = PayrollConfig::default();
        let records = vec![create_test_record(
            "01011990-111A",
            period(2025, 3, 1, 15),
            dec("1000.00"),
        )];

        assert!(matches!(
            employer_declaration(&records, 2025, 1, &config),
            Err(EngineError::InvalidPeriod { .. })
        ));
    }
}
