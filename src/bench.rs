//! Filepath: src/bench.rs
//!
//! Trial harness: repopulate, run the workload, time it, repeat.
//!
//! Every trial starts from a freshly populated list of `initial_keys`
//! distinct keys and replays the same [`Workload`]. Population is serial,
//! unlocked and not timed.
//!
//! - Serial variant: one pass in workload order, no threads, no lock.
//! - Concurrent variants: the workload is cut into one contiguous partition
//!   per worker. Workers and the harness meet at a barrier; the clock starts
//!   when the harness leaves it and stops once every worker was joined, so
//!   thread creation is not part of the measurement.

use std::fmt as StdFmt;
use std::hint::black_box;
use std::panic;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::ConfigError;
use crate::list::SortedList;
use crate::sync::ConcurrentSet;
use crate::tracing_helpers::{debug_log, info_log, warn_log};
use crate::workload::{MAX_KEY, Op, OpMix, Workload, populate};

/// Trials per invocation.
pub const NUM_RUNS: usize = 10;

/// Implementation label of the serial baseline.
pub const SERIAL_LABEL: &str = "serial";

// ============================================================================
//  BenchConfig
// ============================================================================

/// Settings for one benchmark invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Distinct keys inserted before every trial (`n`).
    pub initial_keys: usize,
    /// Operations in the workload (`m`).
    pub ops: usize,
    /// Operation proportions.
    pub mix: OpMix,
    /// Worker threads for the concurrent variants. Ignored by the serial one.
    pub threads: usize,
    /// Seed for every random draw of the run.
    pub seed: u64,
    /// Label echoed in every output row.
    pub case_id: u64,
    /// Number of trials.
    pub trials: usize,
}

impl BenchConfig {
    /// Single-threaded config with [`NUM_RUNS`] trials.
    #[must_use]
    pub const fn new(initial_keys: usize, ops: usize, mix: OpMix, seed: u64, case_id: u64) -> Self {
        Self {
            initial_keys,
            ops,
            mix,
            threads: 1,
            seed,
            case_id,
            trials: NUM_RUNS,
        }
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the number of trials.
    #[must_use]
    pub const fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Check the settings before any work is done.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooManyKeys`] if `initial_keys` exceeds the key range.
    /// - [`ConfigError::ZeroThreads`] if `threads` is 0.
    /// - [`ConfigError::InvalidFraction`] for a negative or non-finite fraction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_keys > MAX_KEY as usize {
            return Err(ConfigError::TooManyKeys {
                requested: self.initial_keys,
                max: MAX_KEY as usize,
            });
        }

        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }

        let fractions = [
            ("member", self.mix.member),
            ("insert", self.mix.insert),
            ("delete", self.mix.delete),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFraction { name, value });
            }
        }

        Ok(())
    }
}

// ============================================================================
//  TrialRecord
// ============================================================================

/// Timing of one trial; `Display` renders the CSV row.
///
/// Columns: `case_id,implementation,threads,trial,elapsed_us,seed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialRecord {
    /// Case label from the command line.
    pub case_id: u64,
    /// `serial`, `rwlock` or `mutex`.
    pub label: &'static str,
    /// Worker count (1 for serial).
    pub threads: usize,
    /// Zero-based trial index.
    pub trial: usize,
    /// Measured window.
    pub elapsed: Duration,
    /// Seed of the run.
    pub seed: u64,
}

impl TrialRecord {
    /// Elapsed time in whole microseconds.
    #[must_use]
    pub const fn elapsed_us(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

impl StdFmt::Display for TrialRecord {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.case_id,
            self.label,
            self.threads,
            self.trial,
            self.elapsed_us(),
            self.seed
        )
    }
}

// ============================================================================
//  Passes
// ============================================================================

/// Run the whole workload on `list` in order, without locking.
///
/// Returns the elapsed time of the pass.
pub fn serial_pass(workload: &Workload, list: &mut SortedList) -> Duration {
    let start = Instant::now();

    for &op in workload {
        let hit = match op {
            Op::Member(key) => list.member(key),
            Op::Insert(key) => list.insert(key),
            Op::Delete(key) => list.delete(key),
        };
        black_box(hit);
    }

    start.elapsed()
}

/// Run the workload on `set` with `threads` scoped workers.
///
/// Worker `t` executes partition `t` in order through [`ConcurrentSet::apply`].
/// The returned duration spans barrier release to the last join.
///
/// # Panics
///
/// Panics if `threads == 0` or a worker thread cannot be created, and
/// re-raises a worker's panic after all workers were joined.
pub fn concurrent_pass<S: ConcurrentSet>(workload: &Workload, set: &S, threads: usize) -> Duration {
    run_workers(workload, set, threads, |t| {
        thread::Builder::new().name(format!("worker-{t}"))
    })
}

/// Holds workers until every one of them exists, then lets them all run or
/// sends them all home.
struct StartGate {
    state: Mutex<Option<bool>>,
    cond: Condvar,
}

impl StartGate {
    const fn new() -> Self {
        Self {
            state: Mutex::new(None),
            cond: Condvar::new(),
        }
    }

    fn release(&self, run: bool) {
        *self.state.lock() = Some(run);
        self.cond.notify_all();
    }

    /// Block until released; `true` means go on to the start barrier.
    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            if let Some(run) = *state {
                return run;
            }
            self.cond.wait(&mut state);
        }
    }
}

/// [`concurrent_pass`] with the builder for worker `t` supplied by `builder`.
///
/// Workers only reach the start barrier once all of them were spawned. If a
/// spawn fails, the ones already running are released without touching the
/// barrier, joined, and the failure is raised as a panic.
fn run_workers<S: ConcurrentSet>(
    workload: &Workload,
    set: &S,
    threads: usize,
    builder: impl Fn(usize) -> thread::Builder,
) -> Duration {
    let partitions = workload.partition(threads);
    let barrier = Barrier::new(threads + 1);
    let gate = StartGate::new();

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(threads);

        for (t, range) in partitions.into_iter().enumerate() {
            let ops = &workload.ops()[range];
            let barrier = &barrier;
            let gate = &gate;

            let spawned = builder(t).spawn_scoped(s, move || {
                if !gate.wait() {
                    return;
                }
                barrier.wait();
                for &op in ops {
                    black_box(set.apply(op));
                }
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    gate.release(false);
                    warn_log!(worker = t, threads, error = %err, "worker spawn failed");
                    panic!("failed to spawn worker {t} of {threads}: {err}");
                }
            }
        }

        gate.release(true);
        barrier.wait();
        let start = Instant::now();

        let mut failure = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                failure.get_or_insert(payload);
            }
        }
        let elapsed = start.elapsed();

        if let Some(payload) = failure {
            panic::resume_unwind(payload);
        }
        elapsed
    })
}

// ============================================================================
//  Benchmark
// ============================================================================

/// A validated config, its workload, and the run's random stream.
#[derive(Debug)]
pub struct Benchmark {
    config: BenchConfig,
    workload: Workload,
    rng: StdRng,
}

impl Benchmark {
    /// Validate `config`, seed the generator and build the workload.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`BenchConfig::validate`].
    pub fn new(config: BenchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        if (config.mix.total() - 1.0).abs() > 1e-9 {
            warn_log!(
                member = config.mix.member,
                insert = config.mix.insert,
                delete = config.mix.delete,
                "operation fractions do not sum to 1, deletes absorb the difference"
            );
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let workload = Workload::generate(config.ops, &config.mix, &mut rng);

        info_log!(
            initial_keys = config.initial_keys,
            ops = config.ops,
            threads = config.threads,
            seed = config.seed,
            "benchmark ready"
        );

        Ok(Self {
            config,
            workload,
            rng,
        })
    }

    /// The validated config.
    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// The workload every trial replays.
    #[must_use]
    pub const fn workload(&self) -> &Workload {
        &self.workload
    }

    /// One serial trial: clear `list`, populate it, time one pass.
    ///
    /// The final state stays in `list` for inspection.
    pub fn serial_trial(&mut self, list: &mut SortedList) -> Duration {
        list.clear();
        populate(list, self.config.initial_keys, &mut self.rng);
        debug_log!(keys = list.len(), "population done");

        serial_pass(&self.workload, list)
    }

    /// One concurrent trial: reset `set` unlocked, populate it, time the
    /// parallel pass.
    ///
    /// The final state stays in `set` for inspection.
    pub fn concurrent_trial<S: ConcurrentSet>(&mut self, set: &mut S) -> Duration {
        let list = set.list_mut();
        list.clear();
        populate(list, self.config.initial_keys, &mut self.rng);
        debug_log!(keys = list.len(), "population done");

        concurrent_pass(&self.workload, set, self.config.threads)
    }

    /// Run every serial trial, handing each record to `sink` as it completes.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `sink`.
    pub fn run_serial<E>(
        &mut self,
        mut sink: impl FnMut(&TrialRecord) -> Result<(), E>,
    ) -> Result<Vec<TrialRecord>, E> {
        let mut list = SortedList::new();
        let mut records = Vec::with_capacity(self.config.trials);

        for trial in 0..self.config.trials {
            let elapsed = self.serial_trial(&mut list);
            debug_log!(trial, elapsed_us = elapsed.as_micros(), "serial trial done");
            let record = self.record(SERIAL_LABEL, 1, trial, elapsed);
            sink(&record)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Run every trial of the concurrent variant `S`, handing each record to
    /// `sink` as it completes.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `sink`.
    pub fn run_concurrent<S: ConcurrentSet, E>(
        &mut self,
        mut sink: impl FnMut(&TrialRecord) -> Result<(), E>,
    ) -> Result<Vec<TrialRecord>, E> {
        let mut set = S::from_list(SortedList::new());
        let mut records = Vec::with_capacity(self.config.trials);

        for trial in 0..self.config.trials {
            let elapsed = self.concurrent_trial(&mut set);
            debug_log!(
                label = S::LABEL,
                threads = self.config.threads,
                trial,
                elapsed_us = elapsed.as_micros(),
                "concurrent trial done"
            );
            let record = self.record(S::LABEL, self.config.threads, trial, elapsed);
            sink(&record)?;
            records.push(record);
        }

        Ok(records)
    }

    const fn record(&self, label: &'static str, threads: usize, trial: usize, elapsed: Duration) -> TrialRecord {
        TrialRecord {
            case_id: self.config.case_id,
            label,
            threads,
            trial,
            elapsed,
            seed: self.config.seed,
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
