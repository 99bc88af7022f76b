//! Compute-once cells for values that are expensive to build and shared across threads.
//!
//! A [`ComputeOnce`] wraps a `once_cell::sync::OnceCell`. Readers that find the value
//! already published take the lock-free fast path; the first reader to miss runs the
//! initializer while later callers for the same cell block until it finishes.
//!
//! [`MemoTable`] is a fixed-size array of such cells addressed by a `usize` key. The
//! cells live as long as the table; there is nothing to free by hand.

use once_cell::sync::OnceCell;
use std::fmt;

/// A value computed at most once, on first demand, by whichever thread asks first.
pub struct ComputeOnce<T> {
    value: OnceCell<T>,
}

impl<T> ComputeOnce<T> {
    pub fn new() -> Self {
        ComputeOnce {
            value: OnceCell::new(),
        }
    }

    /// Returns the value if it has already been computed.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the value, computing it with `init` if no thread has done so yet.
    ///
    /// Concurrent callers for the same cell wait while the first one computes. If
    /// `init` panics the cell stays empty and the next caller retries.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.value.get_or_init(init)
    }

    pub fn is_done(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> Default for ComputeOnce<T> {
    fn default() -> Self {
        ComputeOnce::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ComputeOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("ComputeOnce").field(value).finish(),
            None => f.write_str("ComputeOnce(<pending>)"),
        }
    }
}

/// Memoizes `key -> T` for keys in `0..len` under concurrent access.
pub struct MemoTable<T> {
    cells: Box<[ComputeOnce<T>]>,
}

impl<T> MemoTable<T> {
    pub fn new(len: usize) -> Self {
        MemoTable {
            cells: (0..len).map(|_| ComputeOnce::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        self.cells[key].get()
    }

    /// Returns the entry for `key`, computing it with `compute(key)` on first access.
    pub fn get_or_compute<F>(&self, key: usize, compute: F) -> &T
    where
        F: FnOnce(usize) -> T,
    {
        self.cells[key].get_or_init(|| compute(key))
    }

    /// Number of keys whose value has been computed so far.
    pub fn computed(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_done()).count()
    }
}

impl<T> fmt::Debug for MemoTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoTable")
            .field("len", &self.len())
            .field("computed", &self.computed())
            .finish()
    }
}
