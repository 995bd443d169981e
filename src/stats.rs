//! Per-run aggregation of trial timings.
//!
//! Mirrors how results are plotted downstream: one point per
//! `(case, implementation, threads)` with mean and standard deviation, plus
//! the median and extremes for spotting outlier trials.

use std::fmt as StdFmt;

use crate::bench::TrialRecord;

/// Summary of the elapsed times of one run, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    /// Number of trials.
    pub count: usize,
    /// Arithmetic mean.
    pub mean_us: f64,
    /// Sample standard deviation (n - 1); 0 for a single trial.
    pub std_us: f64,
    /// Fastest trial.
    pub min_us: f64,
    /// Median trial.
    pub median_us: f64,
    /// Slowest trial.
    pub max_us: f64,
}

impl TrialSummary {
    /// Summarize the elapsed times of `records`. `None` if empty.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "microsecond timings fit in f64")]
    pub fn from_records(records: &[TrialRecord]) -> Option<Self> {
        Self::from_micros(records.iter().map(|r| r.elapsed_us() as f64))
    }

    /// Summarize raw microsecond samples. `None` if empty.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "trial counts are small")]
    pub fn from_micros(samples: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        let std = if count > 1 {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        let mid = count / 2;
        let median = if count % 2 == 1 {
            sorted[mid]
        } else {
            f64::midpoint(sorted[mid - 1], sorted[mid])
        };

        Some(Self {
            count,
            mean_us: mean,
            std_us: std,
            min_us: sorted[0],
            median_us: median,
            max_us: sorted[count - 1],
        })
    }
}

impl StdFmt::Display for TrialSummary {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(
            f,
            "trials={} mean={:.1}us std={:.1}us min={:.0}us median={:.1}us max={:.0}us",
            self.count, self.mean_us, self.std_us, self.min_us, self.median_us, self.max_us
        )
    }
}
