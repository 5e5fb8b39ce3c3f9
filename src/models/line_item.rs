//! Salary line items, deductions and their classification tags.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Semantic category of a salary or benefit line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    /// Regular time work.
    Salary,
    /// Overtime at any multiplier.
    Overtime,
    /// Evening or other hourly supplement.
    Supplement,
    /// Travel compensation, per-diem and other benefits.
    Benefit,
    /// Anything not matched by the prefix table.
    Other,
}

/// Semantic category of a deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    /// Tax withheld for a jurisdiction.
    Tax,
    /// Insurance premiums.
    Insurance,
    /// Anything not matched by the prefix table.
    Other,
}

impl DeductionKind {
    /// The code segment identifying this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            DeductionKind::Tax => "TAX",
            DeductionKind::Insurance => "INS",
            DeductionKind::Other => "OTH",
        }
    }
}

/// One line on the pay statement: hours, a supplement, or a benefit.
///
/// # Example
///
/// ```
/// use payroll_engine::models::SalaryLineItem;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let item = SalaryLineItem::priced(
///     "12101",
///     "Aikatyö",
///     Decimal::from_str("72.5").unwrap(),
///     Decimal::from_str("17.00").unwrap(),
/// );
/// assert_eq!(item.total, Decimal::from_str("1232.50").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryLineItem {
    /// Stable classification key, e.g. "12101".
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Quantity (hours, days). Absent for fixed amounts.
    pub quantity: Option<Decimal>,
    /// Unit rate. Absent for fixed amounts.
    pub rate: Option<Decimal>,
    /// Line total.
    pub total: Decimal,
}

impl SalaryLineItem {
    /// Creates a `quantity × rate` line with the total rounded to cents.
    pub fn priced(
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            quantity: Some(quantity),
            rate: Some(rate),
            total: round_money(quantity * rate),
        }
    }

    /// Creates a fixed-amount line with no quantity or rate.
    pub fn fixed(code: impl Into<String>, description: impl Into<String>, total: Decimal) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            quantity: None,
            rate: None,
            total: round_money(total),
        }
    }
}

/// A structured deduction code of the form `KIND/JURISDICTION/NAME`.
///
/// The kind and jurisdiction segments are stable tags decided when the
/// deduction is created. Reports classify by these segments, never by the
/// description text.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{DeductionCode, DeductionKind};
///
/// let code: DeductionCode = "TAX/SE/INCOME".parse().unwrap();
/// assert_eq!(code.jurisdiction, "SE");
/// assert_eq!(code.to_string(), "TAX/SE/INCOME");
/// assert_eq!(DeductionCode::new(DeductionKind::Tax, "SE", "INCOME"), code);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeductionCode {
    /// Kind tag, e.g. "TAX".
    pub kind_tag: String,
    /// Jurisdiction tag, e.g. "SE".
    pub jurisdiction: String,
    /// Name within kind and jurisdiction, e.g. "INCOME".
    pub name: String,
}

impl DeductionCode {
    /// Builds a code from a kind and two tags.
    pub fn new(kind: DeductionKind, jurisdiction: &str, name: &str) -> Self {
        Self {
            kind_tag: kind.tag().to_string(),
            jurisdiction: jurisdiction.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for DeductionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind_tag, self.jurisdiction, self.name)
    }
}

impl FromStr for DeductionCode {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(jurisdiction), Some(name), None)
                if !kind.is_empty() && !jurisdiction.is_empty() && !name.is_empty() =>
            {
                Ok(Self {
                    kind_tag: kind.to_string(),
                    jurisdiction: jurisdiction.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(EngineError::invalid_input(
                "deduction.code",
                format!("'{}' is not of the form KIND/JURISDICTION/NAME", s),
            )),
        }
    }
}

/// A signed reduction from gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// Structured code, see [`DeductionCode`].
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Signed amount; negative reduces net pay.
    pub amount: Decimal,
}

impl Deduction {
    /// Creates a deduction from a structured code.
    pub fn new(code: &DeductionCode, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
            amount,
        }
    }

    /// Parses the structured code.
    pub fn parsed_code(&self) -> EngineResult<DeductionCode> {
        self.code.parse()
    }
}

/// Rounds a monetary amount to cents, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_priced_line_total_is_rounded() {
        let item = SalaryLineItem::priced("12102", "Ylityö 50%", dec("3.333"), dec("8.50"));
        // 3.333 × 8.50 = 28.3305
        assert_eq!(item.total, dec("28.33"));
        assert_eq!(item.quantity, Some(dec("3.333")));
    }

    #[test]
    fn test_fixed_line_has_no_quantity() {
        let item = SalaryLineItem::fixed("MK002", "Matkakorvaus verotettava", dec("600.00"));
        assert_eq!(item.quantity, None);
        assert_eq!(item.rate, None);
        assert_eq!(item.total, dec("600.00"));
    }

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("-0.125")), dec("-0.13"));
        assert_eq!(round_money(dec("50.1")), dec("50.10"));
    }

    #[test]
    fn test_deduction_code_round_trip() {
        let code = DeductionCode::new(DeductionKind::Insurance, "FI", "PENSION");
        assert_eq!(code.to_string(), "INS/FI/PENSION");
        let parsed: DeductionCode = "INS/FI/PENSION".parse().unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_deduction_code_rejects_malformed() {
        for code in ["VÄH", "TAX/SE", "TAX//INCOME", "TAX/SE/INCOME/EXTRA"] {
            assert!(code.parse::<DeductionCode>().is_err(), "accepted {}", code);
        }
    }

    #[test]
    fn test_deduction_exposes_parsed_code() {
        let code = DeductionCode::new(DeductionKind::Tax, "SE", "ALLOWANCE");
        let deduction = Deduction::new(&code, "Allowance tax", dec("-217.78"));
        assert_eq!(deduction.code, "TAX/SE/ALLOWANCE");
        assert_eq!(deduction.parsed_code().unwrap().name, "ALLOWANCE");
    }

    #[test]
    fn test_line_category_serialization() {
        assert_eq!(
            serde_json::to_string(&LineCategory::Supplement).unwrap(),
            "\"supplement\""
        );
        let kind: DeductionKind = serde_json::from_str("\"insurance\"").unwrap();
        assert_eq!(kind, DeductionKind::Insurance);
    }
}
