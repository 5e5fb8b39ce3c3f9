//! Cross-border payroll engine for Finland/Sweden posted workers
//!
//! This crate builds per-period payroll records for employees paid in euros
//! and taxed in both Sweden and Finland, keeps year-to-date accumulators, and
//! aggregates records into monthly, annual, personal-tax and employer
//! declaration reports.

#![warn(missing_docs)]

pub mod aggregation;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
