//! Errors raised while validating a benchmark configuration.
//!
//! Everything after validation is infallible: `insert`/`delete` report
//! "not applicable" through their `bool` result, and allocation failure
//! aborts the process.

use std::fmt as StdFmt;

// ============================================================================
//  ConfigError
// ============================================================================

/// Errors that can occur when building a [`crate::Benchmark`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// More distinct initial keys were requested than the key range holds.
    /// Population would never terminate.
    TooManyKeys {
        /// Requested initial key count.
        requested: usize,
        /// Size of the key range.
        max: usize,
    },

    /// A concurrent variant was asked to run with zero worker threads.
    ZeroThreads,

    /// An operation fraction was negative, NaN, or infinite.
    InvalidFraction {
        /// Which fraction (`member`, `insert` or `delete`).
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl StdFmt::Display for ConfigError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::TooManyKeys { requested, max } => {
                write!(
                    f,
                    "cannot populate {requested} distinct keys from a key range of {max}"
                )
            }

            Self::ZeroThreads => write!(f, "thread count must be at least 1"),

            Self::InvalidFraction { name, value } => {
                write!(f, "{name} fraction must be a finite value >= 0 (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
