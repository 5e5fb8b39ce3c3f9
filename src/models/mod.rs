//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod line_item;
mod pay_period;
mod payroll_record;
mod summary;
mod work_input;

pub use employee::{Employee, Roster, validate_personal_number};
pub use line_item::{
    Deduction, DeductionCode, DeductionKind, LineCategory, SalaryLineItem, round_money,
};
pub use pay_period::{PayPeriod, PeriodHalf, PeriodScheme};
pub use payroll_record::{AuditStep, AuditTrace, AuditWarning, PayrollRecord, TaxInfo};
pub use summary::{
    AnnualEmployeeSummary, AnnualFigures, CompanyAnnualSummary, ContributionLine,
    DeclarationPerson, EmployeeMonthRow, EmployerContributions, EmployerDeclaration,
    MonthlyFigures, MonthlySummary, PersonalTaxRow, PersonalTaxStatement, PersonalTaxTotals,
};
pub use work_input::{BenefitInputs, WorkInputs, WorkQuantity};
