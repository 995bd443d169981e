//! Filepath: src/sync.rs
//!
//! Coarse-grained synchronization around one shared [`SortedList`].
//!
//! # Concurrency Model
//! [`ConcurrentSet`] names two access modes:
//! 1. Shared (`with_list`): used by `member`. Any number of holders.
//! 2. Exclusive (`with_list_mut`): used by `insert` and `delete` for the
//!    whole scan-plus-mutate sequence.
//!
//! Implementations:
//! - [`RwLockList`]: `parking_lot::RwLock`, shared mode really is shared.
//! - [`MutexList`]: `parking_lot::Mutex`, both modes are exclusive.
//!
//! The guard lives exactly as long as the closure it wraps and is released
//! on every exit path, including unwinding. Nodes are only allocated or
//! freed inside `with_list_mut`, so no reader can observe a half-linked or
//! freed node.
//!
//! Neither lock promises a reader/writer fairness policy beyond what
//! `parking_lot` implements.
//!
//! ```rust
//! use rwlist::{ConcurrentSet, RwLockList, SortedList};
//!
//! let set = RwLockList::from_list(SortedList::new());
//! std::thread::scope(|s| {
//!     s.spawn(|| set.insert(1));
//!     s.spawn(|| set.insert(2));
//! });
//! assert_eq!(set.snapshot(), vec![1, 2]);
//! ```

use parking_lot::{Mutex, RwLock};

use crate::list::SortedList;
use crate::workload::Op;

// ============================================================================
//  ConcurrentSet
// ============================================================================

/// A [`SortedList`] behind a locking discipline that makes it shareable.
///
/// Only `with_list`, `with_list_mut` and the ownership conversions are
/// lock-specific; the set operations are derived from them so every
/// implementation applies the same discipline per operation kind.
pub trait ConcurrentSet: Sync + Sized {
    /// Implementation label written to the result CSV.
    const LABEL: &'static str;

    /// Take ownership of `list`.
    fn from_list(list: SortedList) -> Self;

    /// Give the list back.
    fn into_list(self) -> SortedList;

    /// Unlocked access for single-threaded phases (population, reset).
    ///
    /// Requires `&mut self`, so no worker can hold a reference meanwhile.
    fn list_mut(&mut self) -> &mut SortedList;

    /// Run `f` with the lock held in shared mode.
    fn with_list<R>(&self, f: impl FnOnce(&SortedList) -> R) -> R;

    /// Run `f` with the lock held in exclusive mode.
    fn with_list_mut<R>(&self, f: impl FnOnce(&mut SortedList) -> R) -> R;

    /// `member(key)` in shared mode.
    fn member(&self, key: u32) -> bool {
        self.with_list(|list| list.member(key))
    }

    /// `insert(key)` in exclusive mode.
    fn insert(&self, key: u32) -> bool {
        self.with_list_mut(|list| list.insert(key))
    }

    /// `delete(key)` in exclusive mode.
    fn delete(&self, key: u32) -> bool {
        self.with_list_mut(|list| list.delete(key))
    }

    /// Dispatch one workload operation with the matching lock mode.
    fn apply(&self, op: Op) -> bool {
        match op {
            Op::Member(key) => self.member(key),
            Op::Insert(key) => self.insert(key),
            Op::Delete(key) => self.delete(key),
        }
    }

    /// Number of keys, read in shared mode.
    fn len(&self) -> usize {
        self.with_list(SortedList::len)
    }

    /// Returns `true` if the set is empty, read in shared mode.
    fn is_empty(&self) -> bool {
        self.with_list(SortedList::is_empty)
    }

    /// Copy of the keys in ascending order, read in shared mode.
    fn snapshot(&self) -> Vec<u32> {
        self.with_list(|list| list.iter().collect())
    }
}

// ============================================================================
//  RwLockList
// ============================================================================

/// Sorted list behind one global reader-writer lock.
///
/// Members run concurrently with each other; an insert or delete excludes
/// all other readers and writers for its duration.
#[derive(Debug, Default)]
pub struct RwLockList {
    inner: RwLock<SortedList>,
}

impl ConcurrentSet for RwLockList {
    const LABEL: &'static str = "rwlock";

    fn from_list(list: SortedList) -> Self {
        Self {
            inner: RwLock::new(list),
        }
    }

    fn into_list(self) -> SortedList {
        self.inner.into_inner()
    }

    fn list_mut(&mut self) -> &mut SortedList {
        self.inner.get_mut()
    }

    #[inline]
    fn with_list<R>(&self, f: impl FnOnce(&SortedList) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    #[inline]
    fn with_list_mut<R>(&self, f: impl FnOnce(&mut SortedList) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }
}

// ============================================================================
//  MutexList
// ============================================================================

/// Sorted list behind one global mutex.
///
/// Lookups serialize with everything else, same as writes.
#[derive(Debug, Default)]
pub struct MutexList {
    inner: Mutex<SortedList>,
}

impl ConcurrentSet for MutexList {
    const LABEL: &'static str = "mutex";

    fn from_list(list: SortedList) -> Self {
        Self {
            inner: Mutex::new(list),
        }
    }

    fn into_list(self) -> SortedList {
        self.inner.into_inner()
    }

    fn list_mut(&mut self) -> &mut SortedList {
        self.inner.get_mut()
    }

    #[inline]
    fn with_list<R>(&self, f: impl FnOnce(&SortedList) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    #[inline]
    fn with_list_mut<R>(&self, f: impl FnOnce(&mut SortedList) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn exercise<S: ConcurrentSet>() {
        let set = S::from_list([10, 30].into_iter().collect());

        assert!(set.insert(20));
        assert!(!set.insert(20));
        assert!(set.member(20));
        assert!(set.delete(10));
        assert!(!set.delete(10));
        assert!(!set.member(10));
        assert_eq!(set.snapshot(), vec![20, 30]);
        assert_eq!(set.len(), 2);

        assert!(set.apply(Op::Member(30)));
        assert!(set.apply(Op::Insert(5)));
        assert!(set.apply(Op::Delete(5)));

        assert_eq!(set.into_list().iter().collect::<Vec<_>>(), vec![20, 30]);
    }

    #[test]
    fn test_rwlock_list_operations() {
        exercise::<RwLockList>();
    }

    #[test]
    fn test_mutex_list_operations() {
        exercise::<MutexList>();
    }

    #[test]
    fn test_labels() {
        assert_eq!(RwLockList::LABEL, "rwlock");
        assert_eq!(MutexList::LABEL, "mutex");
    }

    #[test]
    fn test_list_mut_bypasses_lock() {
        let mut set = RwLockList::default();
        set.list_mut().insert(3);
        set.list_mut().insert(1);

        assert!(!set.is_empty());
        assert_eq!(set.snapshot(), vec![1, 3]);
    }

    /// Two readers must be able to hold shared mode at the same time:
    /// each waits inside its critical section for the other to arrive.
    #[test]
    fn test_rwlock_readers_share() {
        let set = RwLockList::from_list((0..10).collect());
        let barrier = Barrier::new(2);

        thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    set.with_list(|list| {
                        barrier.wait();
                        assert_eq!(list.len(), 10);
                    });
                });
            }
        });
    }

    #[test]
    fn test_rwlock_reader_blocks_writer() {
        let set = Arc::new(RwLockList::default());
        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let reader = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                set.with_list(|_| {
                    held_tx.send(()).expect("send");
                    release_rx.recv().expect("recv");
                });
            })
        };

        held_rx.recv().expect("reader never took the lock");
        assert!(set.inner.try_write().is_none());
        assert!(set.inner.try_read().is_some());

        release_tx.send(()).expect("send");
        reader.join().expect("reader panicked");
        assert!(set.inner.try_write().is_some());
    }

    #[test]
    fn test_mutex_reader_excludes_reader() {
        let set = Arc::new(MutexList::default());
        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let reader = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                set.with_list(|_| {
                    held_tx.send(()).expect("send");
                    release_rx.recv().expect("recv");
                });
            })
        };

        held_rx.recv().expect("reader never took the lock");
        assert!(set.inner.try_lock().is_none());

        release_tx.send(()).expect("send");
        reader.join().expect("reader panicked");
    }

    #[test]
    fn test_lock_released_after_panic() {
        let set = Arc::new(RwLockList::default());

        let result = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                set.with_list_mut(|_| panic!("writer failed mid-operation"));
            })
            .join()
        };

        assert!(result.is_err());
        assert!(set.insert(1));
        assert_eq!(set.snapshot(), vec![1]);
    }

    #[test]
    fn test_concurrent_disjoint_inserts() {
        const THREADS: u32 = 8;
        const PER_THREAD: u32 = 200;

        let set = RwLockList::default();

        thread::scope(|s| {
            for t in 0..THREADS {
                let set = &set;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        assert!(set.insert(t * PER_THREAD + i));
                        assert!(set.member(t * PER_THREAD + i));
                    }
                });
            }
        });

        let keys = set.snapshot();
        assert_eq!(keys.len(), (THREADS * PER_THREAD) as usize);
        assert!(keys.iter().copied().eq(0..THREADS * PER_THREAD));
    }
}
