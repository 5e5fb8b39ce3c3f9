//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite covers:
//! - Building a single payroll record
//! - A parallel run of 100 and 1000 employees
//! - Monthly aggregation over 1000 records
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::aggregation::monthly_summary;
use payroll_engine::config::{ConfigLoader, PayrollConfig};
use payroll_engine::models::{BenefitInputs, Employee, PayPeriod, Roster, WorkInputs};
use payroll_engine::payroll::{PayrollBuilder, PayrollJob, YtdAccumulator};

fn load_config() -> PayrollConfig {
    ConfigLoader::load("./config/fi_se")
        .expect("Failed to load config")
        .into_config()
}

fn employee_id(i: usize) -> String {
    format!("01011990-{:03}A", i)
}

/// Creates a roster of `count` employees (at most 1000).
fn create_roster(count: usize) -> Roster {
    Roster::from_employees((0..count).map(|i| Employee {
        id: employee_id(i),
        name: format!("Bench Employee {}", i),
        address: "Hämeentie 3, 00530 Helsinki".to_string(),
        bank_details: "IBAN: FI21 1234 5600 0007 85".to_string(),
    }))
    .expect("Failed to create roster")
}

fn january(first: bool) -> PayPeriod {
    let (start, end) = if first { (1, 15) } else { (16, 31) };
    let end_date = NaiveDate::from_ymd_opt(2025, 1, end).unwrap();
    PayPeriod::new(
        NaiveDate::from_ymd_opt(2025, 1, start).unwrap(),
        end_date,
        end_date,
    )
    .unwrap()
}

fn work() -> WorkInputs {
    WorkInputs::new(Decimal::new(2150, 2))
        .with("12101", Decimal::from(72))
        .with("12102", Decimal::from(4))
        .with("12107", Decimal::from(10))
}

fn benefits() -> BenefitInputs {
    BenefitInputs {
        travel_compensation: Some(Decimal::new(12000, 2)),
        per_diem_days: Decimal::from(3),
    }
}

/// Two half-month jobs per employee.
fn create_jobs(count: usize) -> Vec<PayrollJob> {
    (0..count)
        .flat_map(|i| {
            [true, false].map(|first| PayrollJob {
                employee_id: employee_id(i),
                period: january(first),
                work: work(),
                benefits: benefits(),
            })
        })
        .collect()
}

fn bench_single_record(c: &mut Criterion) {
    let config = load_config();
    let roster = create_roster(1);
    let builder = PayrollBuilder::new(&roster, &config);
    let id = employee_id(0);
    let period = january(true);
    let work = work();
    let benefits = benefits();

    c.bench_function("single_record", |b| {
        b.iter(|| {
            let mut ytd = YtdAccumulator::new(2025);
            black_box(builder.build_record(&id, &period, &work, &benefits, &mut ytd))
        })
    });
}

fn bench_parallel_run(c: &mut Criterion) {
    let config = load_config();
    let mut group = c.benchmark_group("parallel_run");

    for count in [100, 1000] {
        let roster = create_roster(count);
        let builder = PayrollBuilder::new(&roster, &config);
        let jobs = create_jobs(count);

        group.throughput(Throughput::Elements(jobs.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &jobs, |b, jobs| {
            b.iter(|| {
                let mut ytd = YtdAccumulator::new(2025);
                black_box(builder.run_parallel(jobs.clone(), &mut ytd))
            })
        });
    }
    group.finish();
}

fn bench_monthly_summary(c: &mut Criterion) {
    let config = load_config();
    let roster = create_roster(500);
    let builder = PayrollBuilder::new(&roster, &config);
    let mut ytd = YtdAccumulator::new(2025);
    let records = builder
        .run_parallel(create_jobs(500), &mut ytd)
        .expect("Failed to build records")
        .records;

    let mut group = c.benchmark_group("aggregation");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("monthly_summary_1000_records", |b| {
        b.iter(|| black_box(monthly_summary(&records, 2025, 1, &config)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_record,
    bench_parallel_run,
    bench_monthly_summary
);
criterion_main!(benches);
