//! Payroll record models.
//!
//! This module contains the [`PayrollRecord`] type and its associated structures
//! that capture all outputs of building one employee's pay for one period,
//! including line items, deductions, totals, YTD snapshot and audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Deduction, Employee, PayPeriod, SalaryLineItem};

/// Primary-jurisdiction tax card details in force for a period.
///
/// Rates are fractions (0.165 for 16.5%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInfo {
    /// Tax card type, e.g. "Perus".
    pub tax_card_type: String,
    /// Withholding rate up to the annual income limit.
    pub base_rate: Decimal,
    /// Withholding rate once the annual income limit is exceeded.
    pub additional_rate: Decimal,
    /// Annual income separating the two rates.
    pub income_limit_year: Decimal,
    /// YTD gross before this period; the bracket-decision input.
    pub ytd_gross_at_period_start: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag known simplifications that did not stop the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// The number the next appended step will carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step, numbering it after the existing ones.
    pub fn push_step(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.next_step_number();
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }

    /// Returns true if a warning with `code` was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The computed result for one employee for one pay period.
///
/// Created once by the builder and never mutated afterwards. The YTD
/// figures are a snapshot as of this period's end.
///
/// Invariant:
/// `net_payment = gross_salary + Σ deductions + pension_insurance + tax_withholding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for this record.
    pub record_id: Uuid,
    /// The pay period.
    pub period: PayPeriod,
    /// Employee reference data as of the build.
    pub employee: Employee,
    /// Primary-jurisdiction tax card details.
    pub tax_info: TaxInfo,
    /// Work line items in configured order.
    pub salary_items: Vec<SalaryLineItem>,
    /// Benefit line items (travel compensation, per-diem).
    pub benefits: Vec<SalaryLineItem>,
    /// Secondary-jurisdiction and other deductions.
    pub deductions: Vec<Deduction>,
    /// Work pay plus taxable benefits.
    pub gross_salary: Decimal,
    /// Primary-jurisdiction withholding (≤ 0).
    pub tax_withholding: Decimal,
    /// Pension insurance premium (≤ 0).
    pub pension_insurance: Decimal,
    /// Health insurance contribution; reported, not netted.
    pub health_insurance: Decimal,
    /// Tax-free portion of pay (per-diem).
    pub tax_free_portion: Decimal,
    /// Amount paid to the employee.
    pub net_payment: Decimal,
    /// YTD gross including this period.
    pub ytd_gross: Decimal,
    /// YTD tax-free including this period.
    pub ytd_tax_free: Decimal,
    /// Calculation steps and warnings.
    pub audit_trace: AuditTrace,
}

impl PayrollRecord {
    /// Sum of all deduction amounts (signed).
    pub fn deduction_total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    /// Sum of all benefit line totals.
    pub fn benefit_total(&self) -> Decimal {
        self.benefits.iter().map(|b| b.total).sum()
    }

    /// Benefits that count towards gross (everything except the tax-free portion).
    pub fn taxable_benefits(&self) -> Decimal {
        self.benefit_total() - self.tax_free_portion
    }

    /// Gross plus the tax-free portion: everything paid for the period before deductions.
    pub fn total_pay(&self) -> Decimal {
        self.gross_salary + self.tax_free_portion
    }

    /// Net payment recomputed from the components.
    pub fn expected_net(&self) -> Decimal {
        self.gross_salary + self.deduction_total() + self.pension_insurance + self.tax_withholding
    }

    /// Returns true if the stored net matches the components within `tolerance`.
    pub fn reconciles_within(&self, tolerance: Decimal) -> bool {
        (self.net_payment - self.expected_net()).abs() <= tolerance
    }
}
