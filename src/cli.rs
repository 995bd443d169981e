//! Command-line surface shared by the `serial`, `rwlock` and `mutex` binaries.
//!
//! ```text
//! rwlock n m mMember mInsert mDelete num_threads [seed] case_id
//! mutex  n m mMember mInsert mDelete num_threads [seed] case_id
//! serial n m mMember mInsert mDelete [seed] case_id
//! ```
//!
//! The trailing group takes one or two values: a lone value is the case id
//! and the seed comes from the clock; two values are `seed case_id`.
//!
//! Stdout carries exactly one CSV row per trial. Everything else (usage,
//! validation errors, `--summary`) goes to stderr.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use crate::bench::{BenchConfig, Benchmark, TrialRecord};
use crate::stats::TrialSummary;
use crate::sync::ConcurrentSet;
use crate::tracing_helpers::warn_log;
use crate::workload::OpMix;

// ============================================================================
//  Arguments
// ============================================================================

/// Arguments of the concurrent variants.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    version,
    about = "Time a sorted linked-list set shared by worker threads behind one global lock"
)]
pub struct ConcurrentArgs {
    /// Distinct keys inserted before every trial
    #[arg(value_name = "N")]
    pub initial_keys: usize,

    /// Total operations in the workload
    #[arg(value_name = "M")]
    pub ops: usize,

    /// Fraction of member operations
    #[arg(value_name = "M_MEMBER", allow_negative_numbers = true)]
    pub member: f64,

    /// Fraction of insert operations
    #[arg(value_name = "M_INSERT", allow_negative_numbers = true)]
    pub insert: f64,

    /// Fraction of delete operations
    #[arg(value_name = "M_DELETE", allow_negative_numbers = true)]
    pub delete: f64,

    /// Worker threads per trial
    #[arg(value_name = "NUM_THREADS")]
    pub threads: usize,

    /// Optional seed followed by the case id
    #[arg(value_name = "[SEED] CASE_ID", num_args = 1..=2, required = true)]
    pub tail: Vec<u64>,

    /// Print mean/std/median of the trials to stderr
    #[arg(long)]
    pub summary: bool,
}

/// Arguments of the serial baseline.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    version,
    about = "Time a sorted linked-list set on one thread without locking"
)]
pub struct SerialArgs {
    /// Distinct keys inserted before every trial
    #[arg(value_name = "N")]
    pub initial_keys: usize,

    /// Total operations in the workload
    #[arg(value_name = "M")]
    pub ops: usize,

    /// Fraction of member operations
    #[arg(value_name = "M_MEMBER", allow_negative_numbers = true)]
    pub member: f64,

    /// Fraction of insert operations
    #[arg(value_name = "M_INSERT", allow_negative_numbers = true)]
    pub insert: f64,

    /// Fraction of delete operations
    #[arg(value_name = "M_DELETE", allow_negative_numbers = true)]
    pub delete: f64,

    /// Optional seed followed by the case id
    #[arg(value_name = "[SEED] CASE_ID", num_args = 1..=2, required = true)]
    pub tail: Vec<u64>,

    /// Print mean/std/median of the trials to stderr
    #[arg(long)]
    pub summary: bool,
}

impl ConcurrentArgs {
    /// Build the benchmark config, drawing a seed from the clock if none was given.
    #[must_use]
    pub fn to_config(&self) -> BenchConfig {
        let (seed, case_id) = split_tail(&self.tail);
        let mix = OpMix::new(self.member, self.insert, self.delete);
        BenchConfig::new(self.initial_keys, self.ops, mix, seed, case_id).with_threads(self.threads)
    }
}

impl SerialArgs {
    /// Build the benchmark config, drawing a seed from the clock if none was given.
    #[must_use]
    pub fn to_config(&self) -> BenchConfig {
        let (seed, case_id) = split_tail(&self.tail);
        let mix = OpMix::new(self.member, self.insert, self.delete);
        BenchConfig::new(self.initial_keys, self.ops, mix, seed, case_id)
    }
}

/// `[case_id]` or `[seed, case_id]`.
fn split_tail(tail: &[u64]) -> (u64, u64) {
    match *tail {
        [seed, case_id] => (seed, case_id),
        [case_id] => (clock_seed(), case_id),
        // clap enforces 1..=2 values; keep the last one as the case id regardless.
        _ => (clock_seed(), tail.last().copied().unwrap_or_default()),
    }
}

/// Seconds since the Unix epoch.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

// ============================================================================
//  Drivers
// ============================================================================

/// Entry point of the serial binary.
#[must_use]
pub fn run_serial(args: &SerialArgs) -> ExitCode {
    drive(args.to_config(), args.summary, |bench, sink| bench.run_serial(sink))
}

/// Entry point of a concurrent binary using the locking discipline `S`.
#[must_use]
pub fn run_concurrent<S: ConcurrentSet>(args: &ConcurrentArgs) -> ExitCode {
    drive(args.to_config(), args.summary, |bench, sink| {
        bench.run_concurrent::<S, io::Error>(sink)
    })
}

type Sink<'a> = &'a mut dyn FnMut(&TrialRecord) -> io::Result<()>;

fn drive(
    config: BenchConfig,
    summary: bool,
    run: impl FnOnce(&mut Benchmark, Sink<'_>) -> io::Result<Vec<TrialRecord>>,
) -> ExitCode {
    let mut bench = match Benchmark::new(config) {
        Ok(bench) => bench,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut out = io::stdout().lock();
    let mut sink = |record: &TrialRecord| {
        writeln!(out, "{record}")?;
        out.flush()
    };

    let records = match run(&mut bench, &mut sink) {
        Ok(records) => records,
        Err(err) => {
            warn_log!(error = %err, "stdout closed");
            eprintln!("error: failed to write results: {err}");
            return ExitCode::FAILURE;
        }
    };

    if summary {
        if let Some(stats) = TrialSummary::from_records(&records) {
            let first = &records[0];
            eprintln!(
                "case={} impl={} threads={} {stats}",
                first.case_id, first.label, first.threads
            );
        }
    }

    ExitCode::SUCCESS
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_args_with_seed() {
        let args = ConcurrentArgs::try_parse_from([
            "rwlock", "1000", "10000", "0.99", "0.005", "0.005", "4", "123", "2",
        ])
        .unwrap();

        let config = args.to_config();
        assert_eq!(config.initial_keys, 1000);
        assert_eq!(config.ops, 10_000);
        assert_eq!(config.threads, 4);
        assert_eq!(config.seed, 123);
        assert_eq!(config.case_id, 2);
        assert_eq!(config.mix, OpMix::new(0.99, 0.005, 0.005));
        assert!(!args.summary);
    }

    #[test]
    fn test_concurrent_args_without_seed() {
        let args =
            ConcurrentArgs::try_parse_from(["rwlock", "10", "20", "1", "0", "0", "2", "5"]).unwrap();

        let config = args.to_config();
        assert_eq!(config.case_id, 5);
        assert_eq!(config.threads, 2);
    }

    #[test]
    fn test_serial_args() {
        let args =
            SerialArgs::try_parse_from(["serial", "5", "0", "0.5", "0.25", "0.25", "9", "1", "--summary"])
                .unwrap();

        let config = args.to_config();
        assert_eq!(config.threads, 1);
        assert_eq!(config.seed, 9);
        assert_eq!(config.case_id, 1);
        assert!(args.summary);
    }

    #[test]
    fn test_missing_case_id_is_usage_error() {
        assert!(SerialArgs::try_parse_from(["serial", "5", "0", "0.5", "0.25", "0.25"]).is_err());
        assert!(ConcurrentArgs::try_parse_from(["rwlock", "5", "0", "0.5", "0.25", "0.25", "4"]).is_err());
    }

    #[test]
    fn test_too_many_trailing_values() {
        assert!(SerialArgs::try_parse_from(["serial", "5", "0", "1", "0", "0", "1", "2", "3"]).is_err());
    }

    #[test]
    fn test_negative_fraction_parses_then_fails_validation() {
        let args = SerialArgs::try_parse_from(["serial", "5", "10", "-0.5", "1", "0.5", "1", "1"]).unwrap();
        assert!(args.to_config().validate().is_err());
    }

    #[test]
    fn test_split_tail() {
        assert_eq!(split_tail(&[7, 3]), (7, 3));
        assert_eq!(split_tail(&[3]).1, 3);
    }
}
