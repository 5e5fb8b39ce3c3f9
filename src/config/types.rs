//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Rates are fractions
//! (0.30 for 30%) and amounts are in the primary currency unless a field
//! says otherwise.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{DeductionKind, LineCategory, PeriodScheme};

/// Reporting and secondary currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Primary (reporting) currency code, e.g. "EUR".
    pub primary: String,
    /// Secondary currency code, e.g. "SEK".
    pub secondary: String,
    /// Primary units per one secondary unit (0.086 EUR per SEK).
    pub rate: Decimal,
}

/// What happens to primary withholding when secondary tax is deducted in the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DoubleTaxationPolicy {
    /// Primary withholding is applied in full.
    Full,
    /// Primary withholding is removed.
    Waive,
    /// Primary withholding is multiplied by `factor`.
    Scale {
        /// Fraction of the primary withholding kept.
        factor: Decimal,
    },
}

/// Primary-jurisdiction (Finland) withholding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryTaxConfig {
    /// Jurisdiction tag used in deduction codes, e.g. "FI".
    pub jurisdiction: String,
    /// Tax card type, e.g. "Perus".
    pub tax_card_type: String,
    /// Rate while YTD gross stays within the annual limit.
    pub base_rate: Decimal,
    /// Rate once YTD gross exceeds the annual limit.
    pub additional_rate: Decimal,
    /// Annual income limit.
    pub annual_income_limit: Decimal,
    /// Interaction with secondary-jurisdiction tax.
    pub double_taxation: DoubleTaxationPolicy,
}

/// Secondary-jurisdiction (Sweden) withholding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryTaxConfig {
    /// Jurisdiction tag used in deduction codes, e.g. "SE".
    pub jurisdiction: String,
    /// Per-period gross above which secondary tax applies.
    pub threshold: Decimal,
    /// Rate applied to gross above the threshold.
    pub rate: Decimal,
    /// Fixed per-period deduction for tax on non-cash allowances.
    pub standard_allowance_deduction: Decimal,
    /// Rate used to attribute secondary tax to tax-free allowances in statements.
    pub allowance_tax_rate: Decimal,
}

/// Employee insurance rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Pension insurance (TyEL) rate, deducted from pay.
    pub pension_rate: Decimal,
    /// Health insurance daily-allowance rate, reported only.
    pub health_rate: Decimal,
}

/// A named share of the employer contribution total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionComponent {
    /// Component name, e.g. "pension".
    pub name: String,
    /// Rate on the contribution base; shares sum to the contribution rate.
    pub share: Decimal,
}

/// Secondary-jurisdiction employer contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributionConfig {
    /// Contribution rate on cash salary.
    pub rate: Decimal,
    /// Components reported separately.
    #[serde(default)]
    pub components: Vec<ContributionComponent>,
}

/// Employer details used for the monthly secondary-jurisdiction declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationConfig {
    /// Employer organisation number, `NNNNNN-NNNN`.
    pub organisation_number: String,
    /// Day of the following month the declared amounts are due.
    pub payment_due_day: u32,
}

impl DeclarationConfig {
    /// Digits before the hyphen of the organisation number.
    ///
    /// Used as the employer part of the payment reference.
    pub fn reference_prefix(&self) -> &str {
        self.organisation_number
            .split_once('-')
            .map_or(self.organisation_number.as_str(), |(prefix, _)| prefix)
    }
}

/// How a salary line item's unit rate is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineRate {
    /// `base_hourly_rate × multiplier`.
    BaseMultiplier {
        /// Multiplier on the employee's base hourly rate.
        multiplier: Decimal,
    },
    /// A fixed unit rate.
    Fixed {
        /// The unit rate.
        rate: Decimal,
    },
}

impl LineRate {
    /// Resolves the unit rate for a given base hourly rate.
    pub fn resolve(&self, base_hourly_rate: Decimal) -> Decimal {
        match *self {
            LineRate::BaseMultiplier { multiplier } => base_hourly_rate * multiplier,
            LineRate::Fixed { rate } => rate,
        }
    }
}

/// A configured salary line-item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemConfig {
    /// Stable code, e.g. "12101".
    pub code: String,
    /// Description printed on the payslip.
    pub description: String,
    /// Unit rate rule.
    pub rate: LineRate,
}

/// Travel compensation benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelBenefitConfig {
    /// Stable code, e.g. "MK002".
    pub code: String,
    /// Description.
    pub description: String,
}

/// Per-diem benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDiemConfig {
    /// Stable code, e.g. "PVR003".
    pub code: String,
    /// Description.
    pub description: String,
    /// Tax-free daily allowance.
    pub daily_rate: Decimal,
}

/// Benefit line-item configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitConfig {
    /// Taxable travel compensation.
    pub travel: TravelBenefitConfig,
    /// Tax-free per-diem.
    pub per_diem: PerDiemConfig,
}

/// Maps a line-item code prefix to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePrefix {
    /// Code prefix.
    pub prefix: String,
    /// Category for codes starting with the prefix.
    pub category: LineCategory,
}

/// Maps a deduction code prefix to a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionPrefix {
    /// Code prefix.
    pub prefix: String,
    /// Kind for codes starting with the prefix.
    pub kind: DeductionKind,
}

/// Prefix tables driving classification. The longest matching prefix wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Line-item prefixes.
    #[serde(default)]
    pub line_items: Vec<LinePrefix>,
    /// Deduction prefixes.
    #[serde(default)]
    pub deductions: Vec<DeductionPrefix>,
}

/// Contents of `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettings {
    /// Currency settings.
    pub currency: CurrencyConfig,
    /// Primary-jurisdiction rules.
    pub primary: PrimaryTaxConfig,
    /// Secondary-jurisdiction rules.
    pub secondary: SecondaryTaxConfig,
    /// Insurance rates.
    pub insurance: InsuranceConfig,
    /// Employer contributions.
    pub employer_contributions: EmployerContributionConfig,
    /// Employer declaration details.
    pub declaration: DeclarationConfig,
    /// Month split scheme.
    #[serde(default)]
    pub period_scheme: PeriodScheme,
}

/// Contents of `line_items.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemSettings {
    /// Salary line items, in payslip order.
    pub line_items: Vec<LineItemConfig>,
    /// Benefit line items.
    pub benefits: BenefitConfig,
    /// Classification prefix tables.
    #[serde(default)]
    pub classification: ClassificationConfig,
}

/// The complete, validated payroll configuration.
///
/// Constructed once and injected into every component that needs rates,
/// thresholds or code tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    settings: PayrollSettings,
    line_items: LineItemSettings,
}

impl PayrollConfig {
    /// Creates a configuration from its two parts, validating both.
    pub fn new(settings: PayrollSettings, line_items: LineItemSettings) -> EngineResult<Self> {
        let config = Self {
            settings,
            line_items,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EngineResult<()> {
        let s = &self.settings;
        if s.currency.rate <= Decimal::ZERO {
            return Err(EngineError::InvalidRate {
                rate: s.currency.rate,
            });
        }

        let non_negative = [
            ("primary.base_rate", s.primary.base_rate),
            ("primary.additional_rate", s.primary.additional_rate),
            ("primary.annual_income_limit", s.primary.annual_income_limit),
            ("secondary.threshold", s.secondary.threshold),
            ("secondary.rate", s.secondary.rate),
            (
                "secondary.standard_allowance_deduction",
                s.secondary.standard_allowance_deduction,
            ),
            ("secondary.allowance_tax_rate", s.secondary.allowance_tax_rate),
            ("insurance.pension_rate", s.insurance.pension_rate),
            ("insurance.health_rate", s.insurance.health_rate),
            ("employer_contributions.rate", s.employer_contributions.rate),
            ("benefits.per_diem.daily_rate", self.line_items.benefits.per_diem.daily_rate),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    field,
                    format!("{} must not be negative", value),
                ));
            }
        }

        if let DoubleTaxationPolicy::Scale { factor } = s.primary.double_taxation {
            if factor < Decimal::ZERO || factor > Decimal::ONE {
                return Err(EngineError::invalid_input(
                    "primary.double_taxation.factor",
                    format!("{} must be between 0 and 1", factor),
                ));
            }
        }

        let contributions = &s.employer_contributions;
        if !contributions.components.is_empty() {
            let shares: Decimal = contributions.components.iter().map(|c| c.share).sum();
            if shares != contributions.rate {
                return Err(EngineError::invalid_input(
                    "employer_contributions.components",
                    format!(
                        "component shares sum to {} but the rate is {}",
                        shares, contributions.rate
                    ),
                ));
            }
        }

        validate_organisation_number(&s.declaration.organisation_number)?;
        if !(1..=28).contains(&s.declaration.payment_due_day) {
            return Err(EngineError::invalid_input(
                "declaration.payment_due_day",
                format!("{} must be between 1 and 28", s.declaration.payment_due_day),
            ));
        }

        if s.primary.jurisdiction == s.secondary.jurisdiction {
            return Err(EngineError::invalid_input(
                "secondary.jurisdiction",
                "primary and secondary jurisdictions must differ",
            ));
        }

        let mut seen = HashSet::new();
        let benefit_codes = [
            self.line_items.benefits.travel.code.as_str(),
            self.line_items.benefits.per_diem.code.as_str(),
        ];
        for code in self
            .line_items
            .line_items
            .iter()
            .map(|item| item.code.as_str())
            .chain(benefit_codes)
        {
            if !seen.insert(code) {
                return Err(EngineError::invalid_input(
                    "line_items.code",
                    format!("duplicate line-item code '{}'", code),
                ));
            }
        }

        for item in &self.line_items.line_items {
            let rate = match item.rate {
                LineRate::BaseMultiplier { multiplier } => multiplier,
                LineRate::Fixed { rate } => rate,
            };
            if rate < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    format!("line_items.{}.rate", item.code),
                    format!("{} must not be negative", rate),
                ));
            }
        }

        Ok(())
    }

    /// Currency settings.
    pub fn currency(&self) -> &CurrencyConfig {
        &self.settings.currency
    }

    /// Primary-jurisdiction rules.
    pub fn primary(&self) -> &PrimaryTaxConfig {
        &self.settings.primary
    }

    /// Secondary-jurisdiction rules.
    pub fn secondary(&self) -> &SecondaryTaxConfig {
        &self.settings.secondary
    }

    /// Insurance rates.
    pub fn insurance(&self) -> &InsuranceConfig {
        &self.settings.insurance
    }

    /// Employer contributions.
    pub fn employer_contributions(&self) -> &EmployerContributionConfig {
        &self.settings.employer_contributions
    }

    /// Employer declaration details.
    pub fn declaration(&self) -> &DeclarationConfig {
        &self.settings.declaration
    }

    /// Month split scheme.
    pub fn period_scheme(&self) -> &PeriodScheme {
        &self.settings.period_scheme
    }

    /// Salary line items, in payslip order.
    pub fn line_items(&self) -> &[LineItemConfig] {
        &self.line_items.line_items
    }

    /// Looks up a configured salary line item by code.
    pub fn line_item(&self, code: &str) -> Option<&LineItemConfig> {
        self.line_items.line_items.iter().find(|item| item.code == code)
    }

    /// Benefit line items.
    pub fn benefits(&self) -> &BenefitConfig {
        &self.line_items.benefits
    }

    /// Classification prefix tables.
    pub fn classification(&self) -> &ClassificationConfig {
        &self.line_items.classification
    }

    /// Returns a copy with a different double-taxation policy.
    pub fn with_double_taxation(mut self, policy: DoubleTaxationPolicy) -> EngineResult<Self> {
        self.settings.primary.double_taxation = policy;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with a different secondary-jurisdiction threshold.
    pub fn with_secondary_threshold(mut self, threshold: Decimal) -> EngineResult<Self> {
        self.settings.secondary.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with a different primary annual income limit.
    pub fn with_annual_income_limit(mut self, limit: Decimal) -> EngineResult<Self> {
        self.settings.primary.annual_income_limit = limit;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with different employer declaration details.
    pub fn with_declaration(mut self, declaration: DeclarationConfig) -> EngineResult<Self> {
        self.settings.declaration = declaration;
        self.validate()?;
        Ok(self)
    }
}

impl Default for PayrollConfig {
    /// The Finland/Sweden ruleset shipped in `config/fi_se`.
    fn default() -> Self {
        let settings = PayrollSettings {
            currency: CurrencyConfig {
                primary: "EUR".to_string(),
                secondary: "SEK".to_string(),
                rate: Decimal::new(86, 3),
            },
            primary: PrimaryTaxConfig {
                jurisdiction: "FI".to_string(),
                tax_card_type: "Perus".to_string(),
                base_rate: Decimal::new(165, 3),
                additional_rate: Decimal::new(44, 2),
                annual_income_limit: Decimal::new(3_980_000, 2),
                double_taxation: DoubleTaxationPolicy::Waive,
            },
            secondary: SecondaryTaxConfig {
                jurisdiction: "SE".to_string(),
                threshold: Decimal::new(83_300, 2),
                rate: Decimal::new(30, 2),
                standard_allowance_deduction: Decimal::new(21_778, 2),
                allowance_tax_rate: Decimal::new(30, 2),
            },
            insurance: InsuranceConfig {
                pension_rate: Decimal::new(715, 4),
                health_rate: Decimal::new(84, 4),
            },
            employer_contributions: EmployerContributionConfig {
                rate: Decimal::new(3142, 4),
                components: vec![
                    component("pension", Decimal::new(1042, 4)),
                    component("sickness_insurance", Decimal::new(368, 4)),
                    component("work_injury", Decimal::new(68, 4)),
                    component("other", Decimal::new(1664, 4)),
                ],
            },
            declaration: DeclarationConfig {
                organisation_number: "556789-0123".to_string(),
                payment_due_day: 12,
            },
            period_scheme: PeriodScheme::half_month(),
        };

        let line_items = LineItemSettings {
            line_items: vec![
                line("12101", "Aikatyö", LineRate::BaseMultiplier { multiplier: Decimal::ONE }),
                line("12101_2", "Aikatyö YT", LineRate::BaseMultiplier { multiplier: Decimal::ONE }),
                line(
                    "12102",
                    "Ylityö 50%",
                    LineRate::BaseMultiplier {
                        multiplier: Decimal::new(5, 1),
                    },
                ),
                line(
                    "12107",
                    "Iltalisä",
                    LineRate::Fixed {
                        rate: Decimal::new(141, 2),
                    },
                ),
            ],
            benefits: BenefitConfig {
                travel: TravelBenefitConfig {
                    code: "MK002".to_string(),
                    description: "Matkakorvaus verotettava".to_string(),
                },
                per_diem: PerDiemConfig {
                    code: "PVR003".to_string(),
                    description: "Ulkomaan päiväraha".to_string(),
                    daily_rate: Decimal::new(6800, 2),
                },
            },
            classification: ClassificationConfig {
                line_items: vec![
                    line_prefix("12101_2", LineCategory::Overtime),
                    line_prefix("12101", LineCategory::Salary),
                    line_prefix("12102", LineCategory::Overtime),
                    line_prefix("12107", LineCategory::Supplement),
                    line_prefix("MK", LineCategory::Benefit),
                    line_prefix("PVR", LineCategory::Benefit),
                ],
                deductions: vec![
                    deduction_prefix("TAX/", DeductionKind::Tax),
                    deduction_prefix("INS/", DeductionKind::Insurance),
                ],
            },
        };

        Self {
            settings,
            line_items,
        }
    }
}

fn validate_organisation_number(number: &str) -> EngineResult<()> {
    let bytes = number.as_bytes();
    let well_formed = bytes.len() == 11
        && bytes[..6].iter().all(u8::is_ascii_digit)
        && bytes[6] == b'-'
        && bytes[7..].iter().all(u8::is_ascii_digit);

    if well_formed {
        Ok(())
    } else {
        Err(EngineError::invalid_input(
            "declaration.organisation_number",
            format!("'{}' is not of the form NNNNNN-NNNN", number),
        ))
    }
}

fn component(name: &str, share: Decimal) -> ContributionComponent {
    ContributionComponent {
        name: name.to_string(),
        share,
    }
}

fn line(code: &str, description: &str, rate: LineRate) -> LineItemConfig {
    LineItemConfig {
        code: code.to_string(),
        description: description.to_string(),
        rate,
    }
}

fn line_prefix(prefix: &str, category: LineCategory) -> LinePrefix {
    LinePrefix {
        prefix: prefix.to_string(),
        category,
    }
}

fn deduction_prefix(prefix: &str, kind: DeductionKind) -> DeductionPrefix {
    DeductionPrefix {
        prefix: prefix.to_string(),
        kind,
    }
}
