//! Tracking Context
//!
//! The tracking context records which observer is currently running. This
//! enables automatic dependency tracking: when a signal is read, we can
//! register the innermost running observer as a subscriber.
//!
//! # Implementation
//!
//! A thread-local stack holds the observers currently executing. Entering a
//! tracked run pushes the observer; the returned guard pops it on drop, so
//! the pop happens on every exit path, including unwinds out of a panicking
//! callback.
//!
//! Nested runs are supported: an observer's callback may trigger another
//! observer, and each signal read is attributed to the innermost entry.
//!
//! # Depth Bound
//!
//! The stack is depth-limited. Exceeding [`MAX_DEPTH`] means an observer is
//! writing to a signal it (transitively) depends on, retriggering itself
//! forever; we fail fast instead of recursing until the call stack blows.

use std::cell::RefCell;

use super::observer::ObserverId;

/// Maximum nesting depth of tracked runs before the runtime assumes a
/// write-during-read cycle and aborts.
pub const MAX_DEPTH: usize = 20;

thread_local! {
    static TRACKING_STACK: RefCell<Vec<ObserverId>> = RefCell::new(Vec::new());
}

/// Guard that pops the tracking stack when dropped.
pub struct TrackingGuard {
    observer_id: ObserverId,
}

impl TrackingGuard {
    /// Push `observer_id` onto the tracking stack.
    ///
    /// # Panics
    ///
    /// Panics if the stack depth exceeds [`MAX_DEPTH`]. The guard is already
    /// constructed at that point, so the unwind pops the entry it pushed.
    pub fn enter(observer_id: ObserverId) -> Self {
        let depth = TRACKING_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(observer_id);
            stack.len()
        });

        let guard = Self { observer_id };

        if depth > MAX_DEPTH {
            panic!(
                "tracking stack overflow (depth {depth}): a signal is being \
                 written from inside an observer that depends on it"
            );
        }

        guard
    }
}

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        TRACKING_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            // Catch mismatched push/pop pairs early in debug builds.
            if let Some(id) = popped {
                debug_assert_eq!(
                    id, self.observer_id,
                    "tracking stack mismatch: expected {:?}, got {:?}",
                    self.observer_id, id
                );
            }
        });
    }
}

/// The innermost running observer, if any.
pub fn current() -> Option<ObserverId> {
    TRACKING_STACK.with(|stack| stack.borrow().last().copied())
}

/// Whether any observer is currently running on this thread.
pub fn is_tracking() -> bool {
    TRACKING_STACK.with(|stack| !stack.borrow().is_empty())
}
