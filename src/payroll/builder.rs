//! Assembly of one employee's payroll record for one period.

use std::collections::HashSet;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    CurrencyConverter, apply_double_taxation_policy, calculate_insurance,
    calculate_primary_withholding, calculate_secondary_tax,
};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, AuditWarning, BenefitInputs, PayPeriod, PayrollRecord, Roster, SalaryLineItem,
    TaxInfo, WorkInputs, round_money,
};

use super::YtdAccumulator;

/// Warning code raised when YTD gross crosses the primary income limit inside a period.
pub const BRACKET_CROSSED_WARNING: &str = "bracket_crossed_mid_period";

/// Builds payroll records against one roster and one configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{BenefitInputs, Employee, PayPeriod, Roster, WorkInputs};
/// use payroll_engine::payroll::{PayrollBuilder, YtdAccumulator};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut roster = Roster::new();
/// roster.insert(Employee {
///     id: "01012020-123X".to_string(),
///     name: "Sam Sample".to_string(),
///     address: "Mechelininkatu 10, Helsinki".to_string(),
///     bank_details: "FI12 3456 7890 1234 56".to_string(),
/// }).unwrap();
/// let config = PayrollConfig::default();
/// let mut ytd = YtdAccumulator::new(2025);
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
/// ).unwrap();
/// let work = WorkInputs::new(Decimal::from(17)).with("12101", Decimal::from(40));
///
/// let record = PayrollBuilder::new(&roster, &config)
///     .build_record("01012020-123X", &period, &work, &BenefitInputs::default(), &mut ytd)
///     .unwrap();
///
/// assert_eq!(record.gross_salary, Decimal::from(680));
/// assert!(record.reconciles_within(Decimal::ZERO));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PayrollBuilder<'a> {
    roster: &'a Roster,
    config: &'a PayrollConfig,
    allow_overlap: bool,
}

impl<'a> PayrollBuilder<'a> {
    /// Creates a builder. Overlapping periods are rejected by default.
    pub fn new(roster: &'a Roster, config: &'a PayrollConfig) -> Self {
        Self {
            roster,
            config,
            allow_overlap: false,
        }
    }

    /// Allows a period to overlap the previous one for the same employee.
    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    /// Builds the record for one employee and period, updating `ytd`.
    ///
    /// Nothing is written to `ytd` unless the whole record builds.
    ///
    /// # Errors
    ///
    /// - `UnknownEmployee` if `employee_id` is not in the roster
    /// - `InvalidPeriod` if the period ends before it starts, ends outside
    ///   the accumulator's fiscal year, or overlaps the employee's previous
    ///   period without [`allow_overlap`](Self::allow_overlap)
    /// - `OutOfOrderUpdate` if the period starts before the previous one
    /// - `InvalidInput` for negative rates or quantities and unknown work codes
    pub fn build_record(
        &self,
        employee_id: &str,
        period: &PayPeriod,
        work: &WorkInputs,
        benefits: &BenefitInputs,
        ytd: &mut YtdAccumulator,
    ) -> EngineResult<PayrollRecord> {
        let start_time = Instant::now();
        let employee = self.roster.get(employee_id)?;
        period.validate()?;
        ytd.check(employee_id, period)?;
        self.check_overlap(employee_id, period, ytd)?;

        let mut trace = AuditTrace::default();

        let salary_items = self.salary_items(work)?;
        let gross_from_work: Decimal = salary_items.iter().map(|item| item.total).sum();

        let (benefit_items, travel, tax_free) = self.benefit_items(benefits)?;
        let gross_salary = gross_from_work + travel;

        trace.push_step(
            "gross_salary",
            "Gross Salary",
            serde_json::json!({
                "salary_items": salary_items.len(),
                "gross_from_work": gross_from_work.to_string(),
                "taxable_benefits": travel.to_string(),
                "tax_free_benefits": tax_free.to_string(),
            }),
            serde_json::json!({ "gross_salary": gross_salary.to_string() }),
            format!(
                "Work {} + taxable benefits {} = {}; per-diem {} is tax-free",
                gross_from_work, travel, gross_salary, tax_free
            ),
        );

        let converter = CurrencyConverter::from_config(self.config.currency())?;
        let gross_secondary = round_money(converter.to_secondary(gross_salary)?);
        trace.push_step(
            "currency",
            "Currency Conversion",
            serde_json::json!({
                "gross_salary": gross_salary.to_string(),
                "rate": converter.rate().to_string(),
            }),
            serde_json::json!({ "gross_secondary": gross_secondary.to_string() }),
            format!(
                "{} {} / {} = {} {}",
                gross_salary,
                self.config.currency().primary,
                converter.rate(),
                gross_secondary,
                self.config.currency().secondary
            ),
        );

        let secondary =
            calculate_secondary_tax(gross_salary, self.config.secondary(), trace.next_step_number())?;
        trace.steps.push(secondary.audit_step);

        let ytd_before = ytd.gross(employee_id);
        let primary = calculate_primary_withholding(
            gross_salary,
            ytd_before,
            self.config.primary(),
            trace.next_step_number(),
        )?;
        trace.steps.push(primary.audit_step);

        if primary.crossed_mid_period {
            warn!(
                employee_id,
                period_start = %period.start_date,
                ytd_before = %ytd_before,
                ytd_including = %primary.ytd_including,
                "Primary income limit crossed mid-period"
            );
            trace.warnings.push(AuditWarning {
                code: BRACKET_CROSSED_WARNING.to_string(),
                message: format!(
                    "YTD gross rose from {} to {} across the {} limit; the additional rate applies \
                     to this period's gross only and earlier periods are not corrected",
                    ytd_before,
                    primary.ytd_including,
                    self.config.primary().annual_income_limit
                ),
                severity: "medium".to_string(),
            });
        }

        let policy = apply_double_taxation_policy(
            primary.withholding,
            !secondary.deductions.is_empty(),
            self.config.primary().double_taxation,
            trace.next_step_number(),
        );
        trace.steps.push(policy.audit_step);
        let tax_withholding = policy.withholding;

        let insurance =
            calculate_insurance(gross_salary, self.config.insurance(), trace.next_step_number())?;
        trace.steps.push(insurance.audit_step);

        let deductions = secondary.deductions;
        let deduction_total: Decimal = deductions.iter().map(|d| d.amount).sum();
        let net_payment = gross_salary + deduction_total + insurance.pension + tax_withholding;

        trace.push_step(
            "net_payment",
            "Net Payment",
            serde_json::json!({
                "gross_salary": gross_salary.to_string(),
                "deductions": deduction_total.to_string(),
                "pension_insurance": insurance.pension.to_string(),
                "tax_withholding": tax_withholding.to_string(),
            }),
            serde_json::json!({ "net_payment": net_payment.to_string() }),
            format!(
                "{} + ({}) + ({}) + ({}) = {}",
                gross_salary, deduction_total, insurance.pension, tax_withholding, net_payment
            ),
        );

        let snapshot = ytd.record(employee_id, period, gross_salary, tax_free)?;
        trace.duration_us = start_time.elapsed().as_micros() as u64;

        info!(
            employee_id,
            period_start = %period.start_date,
            period_end = %period.end_date,
            gross = %gross_salary,
            net = %net_payment,
            ytd_gross = %snapshot.gross,
            "Built payroll record"
        );

        Ok(PayrollRecord {
            record_id: Uuid::new_v4(),
            period: period.clone(),
            employee: employee.clone(),
            tax_info: TaxInfo {
                tax_card_type: self.config.primary().tax_card_type.clone(),
                base_rate: self.config.primary().base_rate,
                additional_rate: self.config.primary().additional_rate,
                income_limit_year: self.config.primary().annual_income_limit,
                ytd_gross_at_period_start: ytd_before,
            },
            salary_items,
            benefits: benefit_items,
            deductions,
            gross_salary,
            tax_withholding,
            pension_insurance: insurance.pension,
            health_insurance: insurance.health,
            tax_free_portion: tax_free,
            net_payment,
            ytd_gross: snapshot.gross,
            ytd_tax_free: snapshot.tax_free,
            audit_trace: trace,
        })
    }

    fn check_overlap(
        &self,
        employee_id: &str,
        period: &PayPeriod,
        ytd: &YtdAccumulator,
    ) -> EngineResult<()> {
        if self.allow_overlap {
            return Ok(());
        }
        match ytd.get(employee_id) {
            Some(entry) if period.start_date <= entry.last_period_end => {
                Err(EngineError::invalid_period(format!(
                    "period {}..{} overlaps the previous period {}..{} for '{}'",
                    period.start_date,
                    period.end_date,
                    entry.last_period_start,
                    entry.last_period_end,
                    employee_id
                )))
            }
            _ => Ok(()),
        }
    }

    /// Builds salary line items in configured order.
    fn salary_items(&self, work: &WorkInputs) -> EngineResult<Vec<SalaryLineItem>> {
        if work.base_hourly_rate < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "work.base_hourly_rate",
                format!("{} must not be negative", work.base_hourly_rate),
            ));
        }

        let known: HashSet<&str> = self
            .config
            .line_items()
            .iter()
            .map(|item| item.code.as_str())
            .collect();
        for entry in &work.quantities {
            if !known.contains(entry.code.as_str()) {
                return Err(EngineError::invalid_input(
                    "work.quantities",
                    format!("unknown line-item code '{}'", entry.code),
                ));
            }
            // Checked per entry, before repeated codes are summed.
            if entry.quantity < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    format!("work.quantities.{}", entry.code),
                    format!("{} must not be negative", entry.quantity),
                ));
            }
        }

        let mut items = Vec::new();
        for line in self.config.line_items() {
            let Some(quantity) = work.quantity_for(&line.code) else {
                continue;
            };
            let rate = line.rate.resolve(work.base_hourly_rate);
            debug!(code = %line.code, %quantity, %rate, "Priced salary line item");
            items.push(SalaryLineItem::priced(
                line.code.clone(),
                line.description.clone(),
                quantity,
                rate,
            ));
        }
        Ok(items)
    }

    /// Builds benefit line items, returning them with the taxable travel
    /// compensation and the tax-free per-diem total.
    fn benefit_items(
        &self,
        benefits: &BenefitInputs,
    ) -> EngineResult<(Vec<SalaryLineItem>, Decimal, Decimal)> {
        let config = self.config.benefits();
        let mut items = Vec::new();
        let mut travel = Decimal::ZERO;
        let mut tax_free = Decimal::ZERO;

        if let Some(amount) = benefits.travel_compensation {
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    "benefits.travel_compensation",
                    format!("{} must not be negative", amount),
                ));
            }
            let item = SalaryLineItem::fixed(
                config.travel.code.clone(),
                config.travel.description.clone(),
                amount,
            );
            travel = item.total;
            items.push(item);
        }

        if benefits.per_diem_days < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "benefits.per_diem_days",
                format!("{} must not be negative", benefits.per_diem_days),
            ));
        }
        if benefits.per_diem_days > Decimal::ZERO {
            let item = SalaryLineItem::priced(
                config.per_diem.code.clone(),
                config.per_diem.description.clone(),
                benefits.per_diem_days,
                config.per_diem.daily_rate,
            );
            tax_free = item.total;
            items.push(item);
        }

        Ok((items, travel, tax_free))
    }
}
