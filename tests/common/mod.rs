//! Common test utilities: tracing setup and comparison helpers.
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//! }
//! ```
//!
//! Environment variables:
//! - `RUST_LOG`: filter directives (e.g. `rwlist=debug`)
//! - `RWLIST_LOG_DIR`: log directory (default: `logs/`)
//! - `RWLIST_LOG_CONSOLE`: set to "0" to disable console output
//!
//! Logs are appended to `logs/rwlist-tests.jsonl` as newline-delimited JSON.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use rwlist::{Op, SortedList};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize console and file logging. Only the first call has an effect.
pub fn init_tracing() {
    INIT.call_once(setup_tracing);
}

/// Configuration for tracing setup.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Log file name.
    pub log_file: String,
    /// Enable console output.
    pub console_enabled: bool,
    /// Default log level if `RUST_LOG` is not set.
    pub default_level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file: "rwlist-tests.jsonl".to_string(),
            console_enabled: true,
            default_level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RWLIST_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if env::var("RWLIST_LOG_CONSOLE").is_ok_and(|v| v == "0") {
            config.console_enabled = false;
        }

        config
    }
}

fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{default_level}")))
}

#[expect(clippy::expect_used)]
fn setup_tracing() {
    let config = TracingConfig::from_env();

    std::fs::create_dir_all(&config.log_dir).expect("Failed to create log directory");

    // Append mode: nextest runs tests in separate processes.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_dir.join(&config.log_file))
        .expect("Failed to open log file");

    let console_layer = config.console_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_thread_ids(true)
            .with_target(true)
            .compact()
            .with_filter(make_filter(config.default_level))
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(make_filter(config.default_level));

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// ============================================================================
//  Oracles
// ============================================================================

/// Apply `ops` to a `BTreeSet`, returning each operation's result.
pub fn oracle_replay(set: &mut BTreeSet<u32>, ops: &[Op]) -> Vec<bool> {
    ops.iter()
        .map(|op| match *op {
            Op::Member(key) => set.contains(&key),
            Op::Insert(key) => set.insert(key),
            Op::Delete(key) => set.remove(&key),
        })
        .collect()
}

/// Keys of a list as a `BTreeSet`.
pub fn key_set(list: &SortedList) -> BTreeSet<u32> {
    list.iter().collect()
}
