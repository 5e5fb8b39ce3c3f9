//! Payroll record building.
//!
//! The [`PayrollBuilder`] turns raw work and benefit inputs into a reconciled
//! [`PayrollRecord`](crate::models::PayrollRecord), reading and advancing the
//! caller-owned [`YtdAccumulator`]. [`PayrollBuilder::run_parallel`] builds
//! many employees at once.

mod builder;
mod run;
mod ytd;

pub use builder::{BRACKET_CROSSED_WARNING, PayrollBuilder};
pub use run::{JobFailure, PayrollJob, RunReport};
pub use ytd::{YtdAccumulator, YtdEntry, YtdSnapshot};
