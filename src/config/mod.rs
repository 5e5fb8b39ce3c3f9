//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll configurations from
//! YAML files: currency, tax and insurance rates, line-item codes and the
//! prefix tables used for classification.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/fi_se").unwrap();
//! println!("Reporting currency: {}", loader.config().currency().primary);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BenefitConfig, ClassificationConfig, ContributionComponent, CurrencyConfig, DeclarationConfig,
    DeductionPrefix, DoubleTaxationPolicy, EmployerContributionConfig, InsuranceConfig,
    LineItemConfig, LineItemSettings, LinePrefix, LineRate, PayrollConfig, PayrollSettings,
    PerDiemConfig, PrimaryTaxConfig, SecondaryTaxConfig, TravelBenefitConfig,
};
