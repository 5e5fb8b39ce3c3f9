//! Monthly all-employee summary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::{Classifier, CurrencyConverter};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeeMonthRow, MonthlyFigures, MonthlySummary, PayrollRecord, PeriodHalf, round_money,
};

use super::check_month;

/// Summarizes one month's records per employee and pay window.
///
/// Each employee gets a first-half row, a second-half row and a combined
/// row that is their field-wise sum. The grand total is the field-wise sum
/// of the combined rows. Secondary-currency columns convert each half-row's
/// primary sum once and round it to cents, so the sums hold exactly.
///
/// # Errors
///
/// Returns `InvalidPeriod` if a record's period does not start in
/// `year`-`month`, or if `month` is not 1–12.
pub fn monthly_summary(
    records: &[PayrollRecord],
    year: i32,
    month: u32,
    config: &PayrollConfig,
) -> EngineResult<MonthlySummary> {
    check_month(year, month)?;
    let converter = CurrencyConverter::from_config(config.currency())?;
    let classifier = Classifier::new(config);
    let scheme = config.period_scheme();

    let mut halves: BTreeMap<&str, (&str, MonthlyFigures, MonthlyFigures)> = BTreeMap::new();
    for record in records {
        if record.period.year_month() != (year, month) {
            return Err(EngineError::invalid_period(format!(
                "record for '{}' starting {} is outside {}-{:02}",
                record.employee.id, record.period.start_date, year, month
            )));
        }
        let figures = record_figures(record, &classifier, config);
        let entry = halves.entry(record.employee.id.as_str()).or_insert_with(|| {
            (
                record.employee.name.as_str(),
                MonthlyFigures::default(),
                MonthlyFigures::default(),
            )
        });
        match record.period.half(scheme) {
            PeriodHalf::First => entry.1 += figures,
            PeriodHalf::Second => entry.2 += figures,
        }
    }

    let mut rows = Vec::with_capacity(halves.len());
    for (employee_id, (name, first, second)) in halves {
        let first_half = with_secondary(first, &converter)?;
        let second_half = with_secondary(second, &converter)?;
        let combined = first_half.clone() + second_half.clone();
        rows.push(EmployeeMonthRow {
            employee_id: employee_id.to_string(),
            name: name.to_string(),
            first_half,
            second_half,
            combined,
        });
    }

    let summary = MonthlySummary {
        year,
        month,
        first_half_total: rows.iter().map(|row| &row.first_half).sum(),
        second_half_total: rows.iter().map(|row| &row.second_half).sum(),
        grand_total: rows.iter().map(|row| &row.combined).sum(),
        rows,
    };

    debug!(
        year,
        month,
        employees = summary.rows.len(),
        records = summary.grand_total.record_count,
        "Built monthly summary"
    );

    Ok(summary)
}

/// Primary-currency figures of one record; secondary columns stay zero.
fn record_figures(
    record: &PayrollRecord,
    classifier: &Classifier<'_>,
    config: &PayrollConfig,
) -> MonthlyFigures {
    let benefits = config.benefits();
    let per_diem_days = record
        .benefits
        .iter()
        .filter(|item| item.code == benefits.per_diem.code)
        .filter_map(|item| item.quantity)
        .sum();
    let travel_compensation = record
        .benefits
        .iter()
        .filter(|item| item.code == benefits.travel.code)
        .map(|item| item.total)
        .sum();

    MonthlyFigures {
        record_count: 1,
        gross: record.gross_salary,
        per_diem: record.tax_free_portion,
        per_diem_days,
        total_pay: record.total_pay(),
        travel_compensation,
        secondary_tax: classifier.secondary_tax(record),
        primary_tax: -record.tax_withholding,
        pension: -record.pension_insurance,
        net: record.net_payment,
        ..MonthlyFigures::default()
    }
}

/// Fills the secondary-currency columns from the row's primary sums.
fn with_secondary(
    mut figures: MonthlyFigures,
    converter: &CurrencyConverter,
) -> EngineResult<MonthlyFigures> {
    let convert = |amount: Decimal| -> EngineResult<Decimal> {
        Ok(round_money(converter.to_secondary(amount)?))
    };
    figures.gross_secondary = convert(figures.gross)?;
    figures.per_diem_secondary = convert(figures.per_diem)?;
    figures.total_pay_secondary = convert(figures.total_pay)?;
    figures.secondary_tax_secondary = convert(figures.secondary_tax)?;
    Ok(figures)
}
