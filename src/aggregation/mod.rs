//! Reporting aggregations over finished payroll records.
//!
//! Every function here is a pure fold over a slice of
//! [`PayrollRecord`](crate::models::PayrollRecord)s: the monthly all-employee
//! summary, annual per-employee and company summaries, the personal tax
//! statement and the employer declaration. Secondary-tax figures are always
//! re-derived from deduction codes through the configured classification.

mod annual;
mod declaration;
mod monthly;
mod personal;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

pub use annual::{annual_employee_summary, company_annual_summary};
pub use declaration::employer_declaration;
pub use monthly::monthly_summary;
pub use personal::personal_tax_statement;

pub(crate) fn check_month(year: i32, month: u32) -> EngineResult<()> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|_| ())
        .ok_or_else(|| {
            EngineError::invalid_period(format!("{}-{:02} is not a valid month", year, month))
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    use crate::calculation::calculate_secondary_tax;
    use crate::config::PayrollConfig;
    use crate::models::{
        AuditTrace, Employee, PayPeriod, PayrollRecord, SalaryLineItem, TaxInfo, round_money,
    };

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub(crate) fn period(year: i32, month: u32, start: u32, end: u32) -> PayPeriod {
        let end_date = NaiveDate::from_ymd_opt(year, month, end).unwrap();
        PayPeriod::new(
            NaiveDate::from_ymd_opt(year, month, start).unwrap(),
            end_date,
            end_date,
        )
        .unwrap()
    }

    pub(crate) fn create_test_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {}", id),
            address: "Storgatan 1, 111 22 Stockholm".to_string(),
            bank_details: "IBAN: FI21 1234 5600 0007 85".to_string(),
        }
    }

    /// A record with fixed hours and benefits whose totals reconcile for `gross`.
    pub(crate) fn create_test_record(
        employee_id: &str,
        period: PayPeriod,
        gross: Decimal,
    ) -> PayrollRecord {
        let config = PayrollConfig::default();
        let deductions = calculate_secondary_tax(gross, config.secondary(), 1)
            .unwrap()
            .deductions;
        let pension = -round_money(gross * config.insurance().pension_rate);
        let health = round_money(gross * config.insurance().health_rate);
        let tax_free = dec("136.00");
        let deduction_total: Decimal = deductions.iter().map(|d| d.amount).sum();

        PayrollRecord {
            record_id: Uuid::new_v4(),
            period,
            employee: create_test_employee(employee_id),
            tax_info: TaxInfo {
                tax_card_type: "Perus".to_string(),
                base_rate: dec("0.165"),
                additional_rate: dec("0.44"),
                income_limit_year: dec("39800.00"),
                ytd_gross_at_period_start: Decimal::ZERO,
            },
            salary_items: vec![
                SalaryLineItem::priced("12101", "Aikatyö", dec("40"), dec("17.00")),
                SalaryLineItem::priced("12101_2", "Aikatyö YT", dec("2"), dec("17.00")),
                SalaryLineItem::priced("12102", "Ylityö 50%", dec("4"), dec("8.50")),
                SalaryLineItem::priced("12107", "Iltalisä", dec("10"), dec("1.41")),
            ],
            benefits: vec![
                SalaryLineItem::fixed("MK002", "Matkakorvaus verotettava", dec("100.00")),
                SalaryLineItem::priced("PVR003", "Ulkomaan päiväraha", dec("2"), dec("68.00")),
            ],
            deductions,
            gross_salary: gross,
            tax_withholding: Decimal::ZERO,
            pension_insurance: pension,
            health_insurance: health,
            tax_free_portion: tax_free,
            net_payment: gross + deduction_total + pension,
            ytd_gross: gross,
            ytd_tax_free: tax_free,
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_fixture_record_reconciles() {
        let record = create_test_record("01011990-111A", period(2025, 1, 1, 15), dec("1000.00"));
        assert!(record.reconciles_within(Decimal::ZERO));
        assert_eq!(record.deduction_total(), dec("-267.88"));
    }

    #[test]
    fn test_check_month() {
        assert!(super::check_month(2025, 12).is_ok());
        assert!(super::check_month(2025, 0).is_err());
        assert!(super::check_month(2025, 13).is_err());
    }
}
