//! Debug-only exclusivity check for the bucket index.
//!
//! Key comparisons and hashing run user code (`Ord`, `Hash`) while a bucket
//! tree is being walked or the bucket vector is being rebuilt. If that code
//! reaches back into the same index, debug builds panic and name both
//! operations instead of letting the inner one observe a half-rehashed
//! state. Release builds compile this to nothing.
//!
//! The tracker is a `Cell`, so an index embedding it stays `Send` but is not
//! `Sync`; cross-thread sharing goes through the caller's own lock.

#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Records which index operation, if any, is currently running.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
        }
    }

    /// Mark `op` as running until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ActiveOp<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("bucket index re-entered by `{op}` while `{outer}` was running");
            }
            self.active.set(Some(op));
            return ActiveOp { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ActiveOp { _z: PhantomData };
        }
    }
}

impl Clone for DebugReentrancy {
    /// A cloned index has no operation in flight.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Clears the running operation on drop, including during unwinding.
pub(crate) struct ActiveOp<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ActiveOp<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(None);
    }
}
