//! Batch Coordinator
//!
//! A batch groups several signal writes into one logical update. While a
//! batch is open, observers that would have been retriggered are parked in a
//! deduplicating pending set instead; when the outermost batch ends, each
//! distinct observer runs exactly once.
//!
//! Without this, overwriting every property of an object-valued signal would
//! re-run an observer once per property instead of once per logical update.
//!
//! # Reentrancy
//!
//! Batches nest: the coordinator keeps a counter of open scopes rather than
//! a boolean, and only the outermost `end` flushes. A write handler that
//! opens its own batch is therefore a no-op for flushing purposes.
//!
//! # Ordering
//!
//! The pending set is a set, not a queue. Observers queued during a batch
//! run exactly once each, in an order that is not part of the contract.

use std::cell::RefCell;

use indexmap::IndexSet;
use tracing::trace;

use super::observer::{self, ObserverId};

struct BatchState {
    /// Number of currently open batch scopes.
    depth: u32,
    /// Observers awaiting notification, deduplicated.
    pending: IndexSet<ObserverId>,
}

thread_local! {
    static BATCH: RefCell<BatchState> = RefCell::new(BatchState {
        depth: 0,
        pending: IndexSet::new(),
    });
}

/// Open a batch scope.
pub fn start() {
    BATCH.with(|state| state.borrow_mut().depth += 1);
}

/// Close a batch scope. Closing the outermost scope flushes the pending set:
/// every distinct queued observer is triggered exactly once, then the set is
/// cleared.
pub fn end() {
    let pending = BATCH.with(|state| {
        let mut state = state.borrow_mut();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            std::mem::take(&mut state.pending)
        } else {
            IndexSet::new()
        }
    });

    if pending.is_empty() {
        return;
    }

    trace!(observers = pending.len(), "batch flush");

    // The set was taken above, so writes performed by these observers happen
    // at depth zero and notify immediately rather than re-entering this
    // flush.
    for id in pending {
        observer::trigger_by_id(id);
    }
}

/// Whether any batch scope is currently open on this thread.
pub fn is_batching() -> bool {
    BATCH.with(|state| state.borrow().depth > 0)
}

/// Queue one observer for notification when the outermost batch ends.
pub(crate) fn add(observer_id: ObserverId) {
    BATCH.with(|state| {
        state.borrow_mut().pending.insert(observer_id);
    });
}

/// Queue several observers at once.
pub(crate) fn add_all<I: IntoIterator<Item = ObserverId>>(observers: I) {
    BATCH.with(|state| {
        let mut state = state.borrow_mut();
        for id in observers {
            state.pending.insert(id);
        }
    });
}

/// Scope guard closing a batch on drop.
///
/// If the scope unwinds out of a panicking callback the counter is still
/// decremented, but the pending set is dropped unflushed; observers are
/// never triggered during an unwind.
struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            BATCH.with(|state| {
                let mut state = state.borrow_mut();
                state.depth = state.depth.saturating_sub(1);
                if state.depth == 0 {
                    state.pending.clear();
                }
            });
        } else {
            end();
        }
    }
}

/// Run `f` inside a batch scope.
///
/// The scope is closed even if `f` panics. On normal completion of the
/// outermost scope, every observer queued during the batch runs exactly
/// once.
pub fn batch<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    start();
    let _guard = BatchGuard;
    f()
}
