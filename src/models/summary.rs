//! Summary models produced by the aggregation engine.
//!
//! Every summary here is derived and read-only: it can always be recomputed
//! from the underlying [`PayrollRecord`](super::PayrollRecord)s and is never a
//! source of truth.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayPeriod;

/// Implements field-wise `Add`, `AddAssign` and `Sum` for a figures struct.
macro_rules! impl_fieldwise_sum {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl AddAssign<&$ty> for $ty {
            fn add_assign(&mut self, rhs: &$ty) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: $ty) {
                *self += &rhs;
            }
        }

        impl Add for $ty {
            type Output = $ty;

            fn add(mut self, rhs: $ty) -> $ty {
                self += &rhs;
                self
            }
        }

        impl<'a> Sum<&'a $ty> for $ty {
            fn sum<I: Iterator<Item = &'a $ty>>(iter: I) -> $ty {
                iter.fold($ty::default(), |mut acc, item| {
                    acc += item;
                    acc
                })
            }
        }

        impl Sum for $ty {
            fn sum<I: Iterator<Item = $ty>>(iter: I) -> $ty {
                iter.fold($ty::default(), |acc, item| acc + item)
            }
        }
    };
}

/// Numeric columns of one monthly summary row.
///
/// Tax and pension figures are positive magnitudes. A half row's
/// secondary-currency columns are its primary sums converted once and rounded
/// to cents.
///
/// In combined and total rows the secondary columns are sums of the rounded
/// half rows, so they can differ by a cent from converting the row's primary
/// figures directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFigures {
    /// Number of records folded into the row.
    pub record_count: u32,
    /// Gross salary (cash earnings).
    pub gross: Decimal,
    /// Tax-free per-diem.
    pub per_diem: Decimal,
    /// Per-diem days.
    pub per_diem_days: Decimal,
    /// Gross plus per-diem.
    pub total_pay: Decimal,
    /// Taxable travel compensation.
    pub travel_compensation: Decimal,
    /// Secondary-jurisdiction tax.
    pub secondary_tax: Decimal,
    /// Primary-jurisdiction withholding.
    pub primary_tax: Decimal,
    /// Pension insurance.
    pub pension: Decimal,
    /// Net payment.
    pub net: Decimal,
    /// Gross in the secondary currency.
    pub gross_secondary: Decimal,
    /// Per-diem in the secondary currency.
    pub per_diem_secondary: Decimal,
    /// Gross plus per-diem in the secondary currency.
    pub total_pay_secondary: Decimal,
    /// Secondary-jurisdiction tax in the secondary currency.
    pub secondary_tax_secondary: Decimal,
}

impl_fieldwise_sum!(MonthlyFigures {
    record_count,
    gross,
    per_diem,
    per_diem_days,
    total_pay,
    travel_compensation,
    secondary_tax,
    primary_tax,
    pension,
    net,
    gross_secondary,
    per_diem_secondary,
    total_pay_secondary,
    secondary_tax_secondary,
});

/// One employee's row in the monthly all-employee summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeMonthRow {
    /// Employee identifier.
    pub employee_id: String,
    /// Employee display name.
    pub name: String,
    /// Figures for the first pay window (zeroes if no record).
    pub first_half: MonthlyFigures,
    /// Figures for the second pay window (zeroes if no record).
    pub second_half: MonthlyFigures,
    /// The combined (YHTEENSÄ) row: `first_half + second_half`.
    pub combined: MonthlyFigures,
}

/// Monthly summary across all employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1–12).
    pub month: u32,
    /// Per-employee rows, ordered by employee identifier.
    pub rows: Vec<EmployeeMonthRow>,
    /// Sum of every employee's first-half row.
    pub first_half_total: MonthlyFigures,
    /// Sum of every employee's second-half row.
    pub second_half_total: MonthlyFigures,
    /// Sum of every employee's combined row.
    pub grand_total: MonthlyFigures,
}

/// Numeric columns of an annual summary. Tax, pension and health are positive magnitudes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualFigures {
    /// Number of records folded in.
    pub record_count: u32,
    /// Total gross salary.
    pub gross: Decimal,
    /// Total net payment.
    pub net: Decimal,
    /// Total secondary-jurisdiction tax.
    pub secondary_tax: Decimal,
    /// Total primary-jurisdiction withholding.
    pub primary_tax: Decimal,
    /// Total pension insurance.
    pub pension: Decimal,
    /// Total health insurance contribution.
    pub health: Decimal,
    /// Total tax-free portion.
    pub tax_free: Decimal,
    /// Regular hours, from salary-category line items.
    pub regular_hours: Decimal,
    /// Overtime hours, from overtime-category line items.
    pub overtime_hours: Decimal,
    /// Supplement hours, from supplement-category line items.
    pub supplement_hours: Decimal,
}

impl_fieldwise_sum!(AnnualFigures {
    record_count,
    gross,
    net,
    secondary_tax,
    primary_tax,
    pension,
    health,
    tax_free,
    regular_hours,
    overtime_hours,
    supplement_hours,
});

impl AnnualFigures {
    /// Regular plus overtime hours.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours
    }

    /// Mean gross per record, zero when there are no records.
    pub fn average_gross(&self) -> Decimal {
        if self.record_count == 0 {
            Decimal::ZERO
        } else {
            super::round_money(self.gross / Decimal::from(self.record_count))
        }
    }
}

/// One employee's totals for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualEmployeeSummary {
    /// Employee identifier.
    pub employee_id: String,
    /// Employee display name.
    pub name: String,
    /// Fiscal year.
    pub year: i32,
    /// The totals.
    pub figures: AnnualFigures,
}

/// Company-wide totals for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAnnualSummary {
    /// Fiscal year.
    pub year: i32,
    /// Per-employee summaries, ordered by employee identifier.
    pub employees: Vec<AnnualEmployeeSummary>,
    /// Sum of all per-employee figures.
    pub totals: AnnualFigures,
}

/// One period's line in an employee's personal tax statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalTaxRow {
    /// The pay period.
    pub period: PayPeriod,
    /// Taxable income (gross salary).
    pub taxable_income: Decimal,
    /// Taxable income in the secondary currency.
    pub taxable_income_secondary: Decimal,
    /// Secondary-jurisdiction tax paid on cash salary.
    pub secondary_tax: Decimal,
    /// Tax-free allowances.
    pub allowances: Decimal,
    /// Tax-free allowances in the secondary currency.
    pub allowances_secondary: Decimal,
    /// Secondary-jurisdiction tax attributed to allowances.
    pub allowance_tax: Decimal,
}

/// Column totals of a personal tax statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalTaxTotals {
    /// Total taxable income.
    pub taxable_income: Decimal,
    /// Total taxable income in the secondary currency.
    pub taxable_income_secondary: Decimal,
    /// Total secondary-jurisdiction tax on cash salary.
    pub secondary_tax: Decimal,
    /// Total allowances.
    pub allowances: Decimal,
    /// Total allowances in the secondary currency.
    pub allowances_secondary: Decimal,
    /// Total tax attributed to allowances.
    pub allowance_tax: Decimal,
}

/// Secondary-jurisdiction tax figures for one employee and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalTaxStatement {
    /// Employee identifier.
    pub employee_id: String,
    /// Employee display name.
    pub name: String,
    /// Fiscal year.
    pub year: i32,
    /// One row per record, in period order.
    pub rows: Vec<PersonalTaxRow>,
    /// Column totals.
    pub totals: PersonalTaxTotals,
    /// Tax on cash salary plus tax on allowances.
    pub total_tax: Decimal,
}

/// A named employer contribution component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLine {
    /// Component name, e.g. "pension".
    pub name: String,
    /// Amount in the secondary currency.
    pub amount: Decimal,
}

/// Employer contributions on a cash-salary base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    /// The salary base the rate was applied to.
    pub base: Decimal,
    /// The configured named components.
    pub components: Vec<ContributionLine>,
    /// `base × rate`.
    pub total: Decimal,
}

/// One person's line in an employer declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationPerson {
    /// Employee identifier.
    pub employee_id: String,
    /// Employee display name.
    pub name: String,
    /// Gross salary in the secondary currency.
    pub gross_secondary: Decimal,
    /// Tax-free benefits (per-diem) in the secondary currency.
    pub tax_free_secondary: Decimal,
    /// Gross plus tax-free benefits in the secondary currency.
    pub total_income_secondary: Decimal,
    /// Preliminary tax in the secondary currency.
    pub preliminary_tax_secondary: Decimal,
    /// Employer contributions on this person's gross.
    pub contributions: EmployerContributions,
    /// Regular plus overtime hours worked in the month.
    pub hours: Decimal,
}

/// Monthly employer declaration figures for the secondary jurisdiction.
///
/// All amounts are in the secondary currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerDeclaration {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Number of distinct employees declared.
    pub employee_count: usize,
    /// Cash salary (gross).
    pub cash_salary: Decimal,
    /// Tax-free benefits (per-diem).
    pub tax_free_benefits: Decimal,
    /// Cash salary plus tax-free benefits.
    pub total_remuneration: Decimal,
    /// Preliminary tax withheld.
    pub preliminary_tax: Decimal,
    /// Employer contributions on the cash salary.
    pub contributions: EmployerContributions,
    /// Preliminary tax plus contributions.
    pub total_to_pay: Decimal,
    /// Date by which `total_to_pay` must be paid.
    pub due_date: NaiveDate,
    /// Payment reference: `YYYYMM`, the employer prefix and a Luhn check digit.
    pub ocr_reference: String,
    /// Per-person lines, ordered by employee identifier.
    pub persons: Vec<DeclarationPerson>,
}
