//! Parallel payroll run across employees.
//!
//! Employees are independent, so each one's jobs are built on a single
//! rayon worker against its own YTD shard. Within an employee the jobs run
//! in period order. Shards are merged back once every worker is done.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitInputs, PayPeriod, PayrollRecord, WorkInputs};

use super::{PayrollBuilder, YtdAccumulator};

/// One (employee, period) unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollJob {
    /// Employee identifier.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// Time-based inputs.
    pub work: WorkInputs,
    /// Benefit inputs.
    #[serde(default)]
    pub benefits: BenefitInputs,
}

/// A job that failed, with the error that stopped its employee.
#[derive(Debug)]
pub struct JobFailure {
    /// Employee whose remaining jobs were skipped.
    pub employee_id: String,
    /// The period that failed.
    pub period: PayPeriod,
    /// Why it failed.
    pub error: EngineError,
}

/// Outcome of a parallel run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Records built, ordered by employee identifier then period.
    pub records: Vec<PayrollRecord>,
    /// At most one failure per employee.
    pub failures: Vec<JobFailure>,
}

impl RunReport {
    /// True if every job built.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Records for one employee, in period order.
    pub fn records_for<'a>(
        &'a self,
        employee_id: &'a str,
    ) -> impl Iterator<Item = &'a PayrollRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.employee.id == employee_id)
    }
}

impl PayrollBuilder<'_> {
    /// Builds every job, in parallel across employees.
    ///
    /// A failing job stops its employee's later jobs, since their YTD input
    /// would be wrong; other employees are unaffected. Records built before
    /// the failure are kept and their totals are merged into `ytd`.
    ///
    /// # Errors
    ///
    /// Only a failed shard merge is returned as an error. Per-job failures
    /// are collected in [`RunReport::failures`].
    pub fn run_parallel(
        &self,
        jobs: Vec<PayrollJob>,
        ytd: &mut YtdAccumulator,
    ) -> EngineResult<RunReport> {
        let start_time = Instant::now();
        let job_count = jobs.len();

        let mut by_employee: BTreeMap<String, Vec<PayrollJob>> = BTreeMap::new();
        for job in jobs {
            by_employee.entry(job.employee_id.clone()).or_default().push(job);
        }

        let groups: Vec<(String, Vec<PayrollJob>, YtdAccumulator)> = by_employee
            .into_iter()
            .map(|(employee_id, mut jobs)| {
                jobs.sort_by_key(|job| job.period.start_date);
                let shard = ytd.shard(&employee_id);
                (employee_id, jobs, shard)
            })
            .collect();

        info!(
            jobs = job_count,
            employees = groups.len(),
            "Starting parallel payroll run"
        );

        let outcomes: Vec<(Vec<PayrollRecord>, Option<JobFailure>, YtdAccumulator)> = groups
            .into_par_iter()
            .map(|(employee_id, jobs, mut shard)| {
                let mut records = Vec::with_capacity(jobs.len());
                let mut failure = None;
                for job in jobs {
                    match self.build_record(
                        &employee_id,
                        &job.period,
                        &job.work,
                        &job.benefits,
                        &mut shard,
                    ) {
                        Ok(record) => records.push(record),
                        Err(error) => {
                            warn!(
                                employee_id = %employee_id,
                                period_start = %job.period.start_date,
                                error = %error,
                                "Payroll job failed; skipping remaining periods"
                            );
                            failure = Some(JobFailure {
                                employee_id: employee_id.clone(),
                                period: job.period,
                                error,
                            });
                            break;
                        }
                    }
                }
                (records, failure, shard)
            })
            .collect();

        let mut report = RunReport::default();
        for (records, failure, shard) in outcomes {
            ytd.merge(shard)?;
            report.records.extend(records);
            report.failures.extend(failure);
        }

        info!(
            records = report.records.len(),
            failures = report.failures.len(),
            duration_us = start_time.elapsed().as_micros() as u64,
            "Finished parallel payroll run"
        );

        Ok(report)
    }
}
