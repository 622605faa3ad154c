//! Weak references with manual pinning
//!
//! A [`WeakReference`] observes a target without keeping it alive. Callers
//! with outstanding work against the target pin it with [`inc_ref`] and
//! release the pin with [`dec_ref`]; while at least one pin is held, the
//! target stays alive. [`get`] always goes through the weak handle, so it
//! still works (best effort) with zero pins.
//!
//! Not thread-safe: one owner, one thread.
//!
//! [`inc_ref`]: WeakReference::inc_ref
//! [`dec_ref`]: WeakReference::dec_ref
//! [`get`]: WeakReference::get

use std::fmt;
use std::rc::{Rc, Weak};

use raya_node_sdk::{NodeError, NodeResult};

/// Weak handle plus an optional strong pin, driven by a reference count.
pub struct WeakReference<T> {
    weak: Weak<T>,
    strong: Option<Rc<T>>,
    ref_count: usize,
}

impl<T> WeakReference<T> {
    /// Observe `target` without pinning it
    pub fn new(target: &Rc<T>) -> Self {
        Self {
            weak: Rc::downgrade(target),
            strong: None,
            ref_count: 0,
        }
    }

    /// Add a pin. On the 0→1 transition the strong hold is re-derived from
    /// the weak handle, and stays empty if the target is already gone.
    /// Returns the new count.
    pub fn inc_ref(&mut self) -> usize {
        self.ref_count += 1;
        if self.ref_count == 1 {
            self.strong = self.weak.upgrade();
        }
        self.ref_count
    }

    /// Release a pin. On the transition to 0 the strong hold is dropped.
    /// Returns the new count.
    ///
    /// Releasing with no pins held is a caller bug and fails with
    /// `ERR_OUT_OF_RANGE`, leaving the count at 0.
    pub fn dec_ref(&mut self) -> NodeResult<usize> {
        if self.ref_count == 0 {
            return Err(NodeError::OutOfRange {
                name: "refCount".to_string(),
                range: ">= 1 before decRef()".to_string(),
                received: "0".to_string(),
            });
        }
        self.ref_count -= 1;
        if self.ref_count == 0 {
            self.strong = None;
        }
        Ok(self.ref_count)
    }

    /// The target if it is still alive, regardless of the pin count
    pub fn get(&self) -> Option<Rc<T>> {
        self.weak.upgrade()
    }

    /// Current number of pins
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Whether a strong hold is currently kept
    pub fn is_pinned(&self) -> bool {
        self.strong.is_some()
    }
}

impl<T> fmt::Debug for WeakReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakReference")
            .field("ref_count", &self.ref_count)
            .field("pinned", &self.strong.is_some())
            .field("alive", &(self.weak.strong_count() > 0))
            .finish()
    }
}
