//! Reduction work budget.
//!
//! Rewriting is bounded by a node budget shared across one solve session.
//! Every allocation of reduced nodes charges the pool; when the budget runs
//! out, reduction bails out with the undefined marker instead of growing
//! without bound. The budget is a plain watermark: a [`PoolMark`] captures
//! the cursor, and rewinding invalidates everything charged after it.
//! Cached reduced forms are stamped with the mark current at their creation,
//! so a rewind followed by [`crate::store::EquationStore::tidy_downstream`]
//! forces their re-derivation instead of leaving dangling state.

use std::cell::Cell;

/// Default node budget for a solve session.
pub const POOL_CAPACITY: u64 = 10_000;

/// Watermark into the pool. Ordered: a later mark compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolMark(u64);

/// Single-threaded node budget with watermark rewind.
#[derive(Debug)]
pub struct Pool {
    cursor: Cell<u64>,
    capacity: u64,
}

impl Pool {
    /// Create a pool with an explicit capacity.
    #[must_use]
    pub const fn new(capacity: u64) -> Self {
        Self {
            cursor: Cell::new(0),
            capacity,
        }
    }

    /// Charge `nodes` against the budget. Returns false when the budget is
    /// exhausted, in which case the cursor is left untouched.
    #[must_use]
    pub fn charge(&self, nodes: u64) -> bool {
        let next = self.cursor.get().saturating_add(nodes);
        if next > self.capacity {
            return false;
        }
        self.cursor.set(next);
        true
    }

    /// Capture the current watermark.
    #[must_use]
    pub fn mark(&self) -> PoolMark {
        PoolMark(self.cursor.get())
    }

    /// Rewind to an earlier watermark. Rewinding to a later mark than the
    /// cursor is a no-op.
    pub fn rewind(&self, mark: PoolMark) {
        if mark.0 < self.cursor.get() {
            self.cursor.set(mark.0);
        }
    }

    /// Nodes charged so far.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.cursor.get()
    }

    /// Total budget.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new(POOL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_and_exhaust() {
        let pool = Pool::new(10);
        assert!(pool.charge(6));
        assert!(pool.charge(4));
        assert!(!pool.charge(1));
        assert_eq!(pool.used(), 10);
    }

    #[test]
    fn test_rewind_restores_budget() {
        let pool = Pool::new(10);
        let start = pool.mark();
        assert!(pool.charge(8));
        pool.rewind(start);
        assert_eq!(pool.used(), 0);
        assert!(pool.charge(10));
    }

    #[test]
    fn test_marks_order_by_time() {
        let pool = Pool::new(100);
        let a = pool.mark();
        assert!(pool.charge(5));
        let b = pool.mark();
        assert!(a < b);
    }

    #[test]
    fn test_rewind_forward_is_noop() {
        let pool = Pool::new(10);
        assert!(pool.charge(3));
        let later = pool.mark();
        pool.rewind(later);
        assert_eq!(pool.used(), 3);
    }
}
