//! Filepath: src/workload.rs
//!
//! Seeded generation of the operation sequence and of the initial keys.
//!
//! One [`StdRng`] drives everything for a run: the workload is generated
//! first, then every trial's population continues the same stream. Passing
//! the generator explicitly keeps runs replayable from the seed alone.

use std::ops::Range;

use rand::Rng;
use rand::rngs::StdRng;

use crate::list::SortedList;
use crate::tracing_helpers::debug_log;

/// Keys are drawn uniformly from `0..MAX_KEY`.
pub const MAX_KEY: u32 = 65_535;

// ============================================================================
//  Op
// ============================================================================

/// The kind of an [`Op`], without its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Lookup.
    Member,
    /// Insertion.
    Insert,
    /// Removal.
    Delete,
}

/// One operation against the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `member(key)`
    Member(u32),
    /// `insert(key)`
    Insert(u32),
    /// `delete(key)`
    Delete(u32),
}

impl Op {
    /// The key this operation targets.
    #[must_use]
    pub const fn key(self) -> u32 {
        match self {
            Self::Member(key) | Self::Insert(key) | Self::Delete(key) => key,
        }
    }

    /// The operation kind.
    #[must_use]
    pub const fn kind(self) -> OpKind {
        match self {
            Self::Member(_) => OpKind::Member,
            Self::Insert(_) => OpKind::Insert,
            Self::Delete(_) => OpKind::Delete,
        }
    }
}

// ============================================================================
//  OpMix / OpCounts
// ============================================================================

/// Target proportion of each operation kind.
///
/// Fractions are expected to sum to 1.0 but this is not enforced; the
/// delete count absorbs whatever is left over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpMix {
    /// Fraction of `Member` operations.
    pub member: f64,
    /// Fraction of `Insert` operations.
    pub insert: f64,
    /// Fraction of `Delete` operations.
    pub delete: f64,
}

impl OpMix {
    /// Build a mix from the three fractions.
    #[must_use]
    pub const fn new(member: f64, insert: f64, delete: f64) -> Self {
        Self {
            member,
            insert,
            delete,
        }
    }

    /// Sum of the three fractions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.member + self.insert + self.delete
    }
}

/// Integer operation counts derived from an [`OpMix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpCounts {
    /// Number of `Member` operations.
    pub member: usize,
    /// Number of `Insert` operations.
    pub insert: usize,
    /// Number of `Delete` operations.
    pub delete: usize,
}

impl OpCounts {
    /// Split `total` operations according to `mix`.
    ///
    /// `member = floor(total * mix.member)`, `insert = floor(total * mix.insert)`
    /// and `delete` takes the remainder, so the counts always sum to `total`.
    /// Fractions above 1 are clamped rather than overflowing the total.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "floor of a non-negative product, clamped to total"
    )]
    pub fn new(total: usize, mix: &OpMix) -> Self {
        let scaled = |fraction: f64| ((total as f64) * fraction).floor().max(0.0) as usize;

        let member = scaled(mix.member).min(total);
        let insert = scaled(mix.insert).min(total - member);
        let delete = total - member - insert;

        Self {
            member,
            insert,
            delete,
        }
    }

    /// Total number of operations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.member + self.insert + self.delete
    }
}

// ============================================================================
//  Workload
// ============================================================================

/// The fixed, pre-generated operation sequence replayed in every trial.
///
/// Read-only once built; workers share it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    ops: Vec<Op>,
    counts: OpCounts,
}

impl Workload {
    /// Generate `total` operations with the proportions of `mix`.
    ///
    /// Members come first, then inserts, then deletes, each with a key drawn
    /// from `0..MAX_KEY`. The sequence is then shuffled by swapping every
    /// index with a partner drawn from the *whole* range. That is not a
    /// uniform permutation, but it is the policy results are recorded with,
    /// so it must stay as is for replays to match.
    pub fn generate(total: usize, mix: &OpMix, rng: &mut StdRng) -> Self {
        let counts = OpCounts::new(total, mix);
        let mut ops = Vec::with_capacity(total);

        ops.extend((0..counts.member).map(|_| Op::Member(random_key(rng))));
        ops.extend((0..counts.insert).map(|_| Op::Insert(random_key(rng))));
        ops.extend((0..counts.delete).map(|_| Op::Delete(random_key(rng))));

        for i in 0..total {
            let j = rng.gen_range(0..total);
            ops.swap(i, j);
        }

        debug_log!(
            member = counts.member,
            insert = counts.insert,
            delete = counts.delete,
            "workload generated"
        );

        Self { ops, counts }
    }

    /// Wrap an explicit operation sequence.
    #[must_use]
    pub fn from_ops(ops: Vec<Op>) -> Self {
        let mut counts = OpCounts::default();
        for op in &ops {
            match op.kind() {
                OpKind::Member => counts.member += 1,
                OpKind::Insert => counts.insert += 1,
                OpKind::Delete => counts.delete += 1,
            }
        }
        Self { ops, counts }
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if there are no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The operations in execution order.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// How many operations of each kind were generated.
    #[must_use]
    pub const fn counts(&self) -> OpCounts {
        self.counts
    }

    /// Iterate over the operations in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Split the index range into `threads` contiguous partitions.
    ///
    /// See [`partition`].
    #[must_use]
    pub fn partition(&self, threads: usize) -> Vec<Range<usize>> {
        partition(self.ops.len(), threads)
    }
}

impl<'a> IntoIterator for &'a Workload {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Split `0..len` into exactly `threads` contiguous, non-overlapping ranges.
///
/// Every range but the last has `len / threads` elements; the last one also
/// takes the remainder. With `len < threads` the leading ranges are empty.
///
/// # Panics
///
/// Panics if `threads == 0`.
#[must_use]
pub fn partition(len: usize, threads: usize) -> Vec<Range<usize>> {
    assert!(threads > 0, "partition requires at least one thread");

    let per_thread = len / threads;
    (0..threads)
        .map(|t| {
            let start = t * per_thread;
            let end = if t == threads - 1 {
                len
            } else {
                start + per_thread
            };
            start..end
        })
        .collect()
}

// ============================================================================
//  Population
// ============================================================================

/// Insert random keys until `n` new keys were added to `list`.
///
/// Duplicates are retried. Starting from an empty list this leaves exactly
/// `n` distinct keys.
///
/// # Panics
///
/// Panics if `n` exceeds the free space in the key range, since the loop
/// could never finish. [`crate::BenchConfig::validate`] rules this out for
/// benchmark runs.
pub fn populate(list: &mut SortedList, n: usize, rng: &mut StdRng) {
    assert!(
        list.len() + n <= MAX_KEY as usize,
        "cannot add {n} distinct keys to a list of {} from a range of {MAX_KEY}",
        list.len()
    );

    let mut inserted = 0;
    while inserted < n {
        if list.insert(random_key(rng)) {
            inserted += 1;
        }
    }
}

#[inline]
fn random_key(rng: &mut StdRng) -> u32 {
    rng.gen_range(0..MAX_KEY)
}

// ============================================================================
//  Tests
// ============================================================================
