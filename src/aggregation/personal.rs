//! Personal secondary-jurisdiction tax statement.

use chrono::Datelike;

use crate::calculation::{Classifier, CurrencyConverter};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, PayrollRecord, PersonalTaxRow, PersonalTaxStatement, PersonalTaxTotals, round_money,
};

/// Builds one employee's secondary-jurisdiction tax statement for a year.
///
/// One row per record in period order. Tax on allowances is the tax-free
/// portion times the configured allowance tax rate. Secondary-currency
/// columns are converted per row and rounded to cents; totals sum the rows.
///
/// # Errors
///
/// Returns `InvalidInput` if a record belongs to another employee or ends
/// outside `year`.
pub fn personal_tax_statement(
    employee: &Employee,
    records: &[PayrollRecord],
    year: i32,
    config: &PayrollConfig,
) -> EngineResult<PersonalTaxStatement> {
    let converter = CurrencyConverter::from_config(config.currency())?;
    let classifier = Classifier::new(config);
    let allowance_tax_rate = config.secondary().allowance_tax_rate;

    let mut ordered: Vec<&PayrollRecord> = Vec::with_capacity(records.len());
    for record in records {
        if record.employee.id != employee.id {
            return Err(EngineError::invalid_input(
                "records",
                format!(
                    "record for '{}' in the tax statement of '{}'",
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
        ordered.push(record);
    }
    ordered.sort_by_key(|record| record.period.start_date);

    let mut rows = Vec::with_capacity(ordered.len());
    let mut totals = PersonalTaxTotals::default();
    for record in ordered {
        let row = PersonalTaxRow {
            period: record.period.clone(),
            taxable_income: record.gross_salary,
            taxable_income_secondary: round_money(converter.to_secondary(record.gross_salary)?),
            secondary_tax: classifier.secondary_tax(record),
            allowances: record.tax_free_portion,
            allowances_secondary: round_money(converter.to_secondary(record.tax_free_portion)?),
            allowance_tax: round_money(record.tax_free_portion * allowance_tax_rate),
        };

        totals.taxable_income += row.taxable_income;
        totals.taxable_income_secondary += row.taxable_income_secondary;
        totals.secondary_tax += row.secondary_tax;
        totals.allowances += row.allowances;
        totals.allowances_secondary += row.allowances_secondary;
        totals.allowance_tax += row.allowance_tax;
        rows.push(row);
    }

    Ok(PersonalTaxStatement {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        year,
        total_tax: totals.secondary_tax + totals.allowance_tax,
        rows,
        totals,
    })
}
