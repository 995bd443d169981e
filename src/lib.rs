//! # `rwlist`
//!
//! Throughput of a sorted singly linked list used as a shared ordered set,
//! under three access disciplines:
//!
//! | Label | Type | Lookups | Inserts / deletes |
//! |-------|------|---------|-------------------|
//! | `serial` | [`SortedList`] | one thread, no lock | one thread, no lock |
//! | `rwlock` | [`RwLockList`] | shared mode, concurrent | exclusive mode |
//! | `mutex` | [`MutexList`] | exclusive | exclusive |
//!
//! A run generates one seeded [`Workload`] of member/insert/delete
//! operations, then executes it [`NUM_RUNS`] times, each time against a
//! freshly populated list. Concurrent variants split the workload into one
//! contiguous partition per worker and time only the window between a start
//! barrier and the last join.
//!
//! ## Thread Safety
//!
//! [`SortedList`] itself is a plain single-owner structure; every mutation
//! takes `&mut self`. Sharing it between threads requires one of the
//! [`ConcurrentSet`] wrappers:
//!
//! ```rust
//! use rwlist::{BenchConfig, Benchmark, OpMix, RwLockList};
//! use std::convert::Infallible;
//!
//! let config = BenchConfig::new(100, 1_000, OpMix::new(0.9, 0.05, 0.05), 42, 1)
//!     .with_threads(4)
//!     .with_trials(2);
//! let mut bench = Benchmark::new(config)?;
//!
//! let records = bench.run_concurrent::<RwLockList, Infallible>(|_| Ok(()))
//!     .unwrap_or_else(|never| match never {});
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].label, "rwlock");
//! # Ok::<(), rwlist::ConfigError>(())
//! ```
//!
//! ## Determinism
//!
//! All randomness of a run (workload keys, shuffle, every trial's initial
//! keys) comes from one `StdRng` seeded with [`BenchConfig::seed`]. The seed
//! is written into every output row, so any run can be replayed.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod tracing_helpers;

pub mod bench;
pub mod cli;
pub mod error;
pub mod list;
pub mod stats;
pub mod sync;
pub mod workload;


// Re-export main types for convenience
pub use bench::{BenchConfig, Benchmark, NUM_RUNS, TrialRecord, concurrent_pass, serial_pass};
pub use error::ConfigError;
pub use list::SortedList;
pub use stats::TrialSummary;
pub use sync::{ConcurrentSet, MutexList, RwLockList};
pub use workload::{MAX_KEY, Op, OpCounts, OpKind, OpMix, Workload, partition, populate};

// ============================================================================
//  Logging
// ============================================================================

/// Install a `tracing` subscriber writing to stderr.
///
/// Filtering follows `RUST_LOG` (default `warn`). Set `RWLIST_LOG_FORMAT=json`
/// for newline-delimited JSON instead of the compact console format. Stdout
/// is left untouched for the CSV rows.
///
/// Safe to call more than once; only the first call installs anything.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

    let make_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("RWLIST_LOG_FORMAT").is_ok_and(|v| v == "json");

    let console_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_target(true)
            .compact()
            .with_filter(make_filter())
    });

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(make_filter())
    });

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .try_init();
}

/// No-op without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}
