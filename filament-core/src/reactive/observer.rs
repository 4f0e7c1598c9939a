//! Observer Implementation
//!
//! An Observer is a re-runnable computation with an exact, self-refreshing
//! dependency set. It runs once eagerly when created through [`observe`],
//! and re-runs synchronously whenever a signal it read on its last run is
//! written (subject to batching).
//!
//! # Trigger Protocol
//!
//! Each run:
//!
//! 1. Unsubscribes from every signal observed on the previous run, so stale
//!    dependencies never linger.
//! 2. Pushes itself onto the tracking stack (depth-bounded, guard-popped).
//! 3. Invokes the callback; every signal read during the call re-registers
//!    the observer and rebuilds the observed set.
//! 4. Pops the tracking stack (on all exit paths, including panics).
//! 5. Deduplicates its subscription on every signal it observed.
//! 6. On the very first completed run only, runs the completeness pass:
//!    `observe_all` on every observed object-shaped signal, so a
//!    computation that read a whole object without touching each field
//!    still reacts to writes of any field.
//!
//! # Registry
//!
//! Observers register in a process-wide weak registry keyed by
//! [`ObserverId`], so signals can hold plain ids rather than owning
//! pointers. Dropping the [`Observer`] handle unregisters it; subscriber
//! entries left behind on signals are skipped and pruned during
//! notification.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexSet;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use super::context::TrackingGuard;
use super::signal::{self, SignalId};

/// Unique identifier for an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

struct ObserverInner {
    id: ObserverId,

    /// The user computation to re-run.
    callback: Box<dyn Fn() + Send + Sync>,

    /// Whether the observer is subscribed to anything. False after `stop`
    /// and before the first `start`.
    awake: AtomicBool,

    /// Latch for the first-run completeness pass.
    has_run: AtomicBool,

    /// Exactly the signals read during the most recent completed run,
    /// rebuilt from scratch every run.
    observed: Mutex<IndexSet<SignalId>>,
}

static REGISTRY: OnceLock<RwLock<HashMap<ObserverId, Weak<ObserverInner>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<ObserverId, Weak<ObserverInner>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn lookup(id: ObserverId) -> Option<Arc<ObserverInner>> {
    registry().read().get(&id).and_then(Weak::upgrade)
}

/// Record signals read during a run into the running observer's observed
/// set. Called by the signal graph after registering subscriptions; a dead
/// or unregistered id is a no-op.
pub(crate) fn record_observed(id: ObserverId, signals: &[SignalId]) {
    if let Some(inner) = lookup(id) {
        inner.observed.lock().extend(signals.iter().copied());
    }
}

/// Trigger the observer behind `id`, if it is still alive.
///
/// Returns false when the id no longer resolves to a live observer, so the
/// caller can prune its subscriber entry.
pub(crate) fn trigger_by_id(id: ObserverId) -> bool {
    match lookup(id) {
        Some(inner) => {
            run(&inner);
            true
        }
        None => false,
    }
}

/// Unsubscribe `inner` from everything it currently observes.
fn clear_subscriptions(inner: &ObserverInner) {
    let observed: Vec<SignalId> = {
        let mut observed = inner.observed.lock();
        observed.drain(..).collect()
    };
    for id in observed {
        signal::remove_observer(id, inner.id);
    }
}

/// Execute one run of the trigger protocol. No-op while asleep.
fn run(inner: &Arc<ObserverInner>) -> bool {
    if !inner.awake.load(Ordering::SeqCst) {
        return false;
    }

    trace!(observer = ?inner.id, "trigger");

    clear_subscriptions(inner);

    {
        let _guard = TrackingGuard::enter(inner.id);
        (inner.callback)();
    }

    let observed: Vec<SignalId> = inner.observed.lock().iter().copied().collect();
    for id in &observed {
        signal::dedup_subscribers(*id);
    }

    if !inner.has_run.swap(true, Ordering::SeqCst) {
        // First run: eagerly cover every field of every object read, then
        // fold the new subscriptions into the observed set so the next
        // clear releases them too.
        let mut extra = Vec::new();
        for id in observed {
            extra.extend(signal::observe_all(id, inner.id));
        }
        if !extra.is_empty() {
            inner.observed.lock().extend(extra);
        }
    }

    true
}

/// Handle to a reactive computation.
///
/// Returned by [`observe`]. Keep it alive for as long as the computation
/// should react; dropping the handle unregisters the observer and no
/// further runs occur.
pub struct Observer {
    inner: Arc<ObserverInner>,
}

impl Observer {
    /// Construct an idle observer. It does not run and is not subscribed
    /// until [`start`](Observer::start) is called; [`observe`] is the
    /// eager-start convenience.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(ObserverInner {
            id: ObserverId::new(),
            callback: Box::new(callback),
            awake: AtomicBool::new(false),
            has_run: AtomicBool::new(false),
            observed: Mutex::new(IndexSet::new()),
        });

        registry()
            .write()
            .insert(inner.id, Arc::downgrade(&inner));

        Self { inner }
    }

    /// The observer's unique ID.
    pub fn id(&self) -> ObserverId {
        self.inner.id
    }

    /// Re-run the computation now, as a write to a dependency would.
    /// No-op while stopped.
    pub fn trigger(&self) -> bool {
        run(&self.inner)
    }

    /// Wake the observer and run it once. Returns false if it was already
    /// awake.
    pub fn start(&self) -> bool {
        if self.inner.awake.swap(true, Ordering::SeqCst) {
            return false;
        }
        run(&self.inner);
        true
    }

    /// Put the observer to sleep, clearing every subscription. Returns
    /// false if it was already stopped.
    pub fn stop(&self) -> bool {
        if !self.inner.awake.swap(false, Ordering::SeqCst) {
            return false;
        }
        clear_subscriptions(&self.inner);
        true
    }

    /// Whether the observer is currently awake.
    pub fn is_awake(&self) -> bool {
        self.inner.awake.load(Ordering::SeqCst)
    }

    /// Number of signals observed on the most recent completed run.
    pub fn observed_count(&self) -> usize {
        self.inner.observed.lock().len()
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        registry().write().remove(&self.inner.id);
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.inner.id)
            .field("awake", &self.is_awake())
            .field("observed", &self.observed_count())
            .finish()
    }
}

/// Construct an observer around `callback` and run it immediately.
pub fn observe<F>(callback: F) -> Observer
where
    F: Fn() + Send + Sync + 'static,
{
    let observer = Observer::new(callback);
    observer.start();
    observer
}
